use clap::ValueEnum;
use rxrename_core::{OutputFormat as CoreOutputFormat, Preview, RenumberMode};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PreviewArg {
    /// One `"source" => "destination"` line per rename
    Pairs,
    Table,
}

impl From<PreviewArg> for Preview {
    fn from(arg: PreviewArg) -> Self {
        match arg {
            PreviewArg::Pairs => Self::Pairs,
            PreviewArg::Table => Self::Table,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(arg: OutputFormat) -> Self {
        match arg {
            OutputFormat::Summary => Self::Summary,
            OutputFormat::Json => Self::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RenumberArg {
    /// Keep frame numbers as captured
    None,
    /// Shift frames so the first one is 1, keeping gaps
    Offset,
    /// Number frames 1, 2, 3, ... by rank
    Sequential,
}

impl From<RenumberArg> for RenumberMode {
    fn from(arg: RenumberArg) -> Self {
        match arg {
            RenumberArg::None => Self::None,
            RenumberArg::Offset => Self::Offset,
            RenumberArg::Sequential => Self::Sequential,
        }
    }
}
