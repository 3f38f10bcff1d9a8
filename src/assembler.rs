/// Assembler that splices fetched include bodies into processed output
use crate::processor::OutputItem;

/// The processor and the include resolver disagreed about how many includes there are
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyError {
    MissingBody { index: usize, available: usize },
    UnusedBodies { used: usize, available: usize },
}

impl std::fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssemblyError::MissingBody { index, available } => write!(
                f,
                "No body for include #{} ({} fetched)",
                index, available
            ),
            AssemblyError::UnusedBodies { used, available } => write!(
                f,
                "Only {} of {} fetched include bodies were placed",
                used, available
            ),
        }
    }
}

impl std::error::Error for AssemblyError {}

/// Build the final body from output items and index-aligned include bodies
pub fn assemble(items: &[OutputItem], bodies: &[Vec<u8>]) -> Result<Vec<u8>, AssemblyError> {
    let mut out = Vec::new();
    let mut placeholders = 0;

    for item in items {
        match item {
            OutputItem::Text(bytes) => out.extend_from_slice(bytes),
            OutputItem::Placeholder(index) => {
                let body = bodies.get(*index).ok_or(AssemblyError::MissingBody {
                    index: *index,
                    available: bodies.len(),
                })?;
                out.extend_from_slice(body);
                placeholders += 1;
            }
        }
    }

    if placeholders != bodies.len() {
        return Err(AssemblyError::UnusedBodies {
            used: placeholders,
            available: bodies.len(),
        });
    }
    Ok(out)
}
