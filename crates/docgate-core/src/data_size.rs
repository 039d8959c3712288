//! Human-readable byte sizes ("25MB", "512KB", "1048576").
//!
//! Units are binary multiples, so `1MB` is 1024 * 1024 bytes.

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;
const TB: u64 = GB * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataSizeError {
    #[error("Empty data size")]
    Empty,

    #[error("Invalid data size number: {0}")]
    InvalidNumber(String),

    #[error("Unknown data size unit: {0} (expected B, KB, MB, GB or TB)")]
    UnknownUnit(String),

    #[error("Data size overflows u64: {0}")]
    Overflow(String),
}

/// Parse a data size such as `25MB`, `25 mb`, `100KB` or a plain byte count.
pub fn parse_data_size(input: &str) -> Result<u64, DataSizeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DataSizeError::Empty);
    }

    let split_at = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split_at);

    let value: u64 = number
        .parse()
        .map_err(|_| DataSizeError::InvalidNumber(trimmed.to_string()))?;

    let multiplier = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "KB" => KB,
        "MB" => MB,
        "GB" => GB,
        "TB" => TB,
        other => return Err(DataSizeError::UnknownUnit(other.to_string())),
    };

    value
        .checked_mul(multiplier)
        .ok_or_else(|| DataSizeError::Overflow(trimmed.to_string()))
}

/// Format a byte count using the largest unit that divides it exactly.
pub fn format_data_size(bytes: u64) -> String {
    for (unit, size) in [("TB", TB), ("GB", GB), ("MB", MB), ("KB", KB)] {
        if bytes >= size && bytes % size == 0 {
            return format!("{}{}", bytes / size, unit);
        }
    }
    format!("{}B", bytes)
}
