use std::fmt;
use std::path::PathBuf;

/// Pipeline stage a source file belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Diagnostic produced while building a shader program.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    /// The source file could not be read; the stage was compiled from empty source.
    Read { stage: ShaderStage, path: PathBuf, message: String },
    /// Parse or validation failure, with the compiler's rendered diagnostic.
    Compile { stage: ShaderStage, message: String },
    /// The stages compiled but do not form a usable program.
    Link { message: String },
}

impl ShaderError {
    pub(crate) fn link(message: impl Into<String>) -> Self {
        Self::Link { message: message.into() }
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::Read { stage, path, message } => {
                write!(f, "{stage} shader file not read ({}): {message}", path.display())
            }
            ShaderError::Compile { stage, message } => {
                write!(f, "{stage} shader compilation failed:\n{message}")
            }
            ShaderError::Link { message } => write!(f, "program linking failed: {message}"),
        }
    }
}

impl std::error::Error for ShaderError {}
