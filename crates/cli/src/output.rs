use clap::ValueEnum;

/// Supported output formats for `scan`.
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Sarif,
}

impl From<Format> for reporters::Format {
    fn from(fmt: Format) -> Self {
        match fmt {
            Format::Text => reporters::Format::Text,
            Format::Json => reporters::Format::Json,
            Format::Sarif => reporters::Format::Sarif,
        }
    }
}

/// Output formats for `heatmap` and `quick`.
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum SummaryFormat {
    Text,
    Json,
}

impl From<SummaryFormat> for reporters::SummaryFormat {
    fn from(fmt: SummaryFormat) -> Self {
        match fmt {
            SummaryFormat::Text => reporters::SummaryFormat::Text,
            SummaryFormat::Json => reporters::SummaryFormat::Json,
        }
    }
}

/// Output formats for `flow`.
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum FlowFormat {
    Text,
    Json,
    Dot,
    Mermaid,
}

impl From<FlowFormat> for reporters::FlowFormat {
    fn from(fmt: FlowFormat) -> Self {
        match fmt {
            FlowFormat::Text => reporters::FlowFormat::Text,
            FlowFormat::Json => reporters::FlowFormat::Json,
            FlowFormat::Dot => reporters::FlowFormat::Dot,
            FlowFormat::Mermaid => reporters::FlowFormat::Mermaid,
        }
    }
}
