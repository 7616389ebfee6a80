use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    /// Read the `<kind> <len>\0` frame header.
    ///
    /// Returns the kind and the declared body length, leaving the reader
    /// positioned at the first body byte.
    pub fn parse_header(data_reader: &mut impl BufRead) -> anyhow::Result<(ObjectType, usize)> {
        let mut header = Vec::new();
        data_reader.read_until(b'\0', &mut header)?;

        if header.pop() != Some(b'\0') {
            return Err(anyhow::anyhow!("missing null separator after header"));
        }

        let header = std::str::from_utf8(&header)?;
        let (object_type, size) = header
            .split_once(' ')
            .ok_or_else(|| anyhow::anyhow!("malformed header {header:?}"))?;
        let size = size
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("invalid declared length {size:?}"))?;

        Ok((ObjectType::try_from(object_type)?, size))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            _ => Err(anyhow::anyhow!("Invalid object type {value:?}")),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
