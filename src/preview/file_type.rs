/// Rendering category of an attachment, classified by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Plain text and source code, previewed as decoded text
    Text,
    Image,
    Svg,
    Audio,
    Video,
    Pdf,
    Html,
    /// Tabular data, handed raw to the table renderer
    Table,
}

impl FileType {
    /// Classify a file by name. Unknown extensions (and names without an
    /// extension) are not previewable and return `None`.
    pub fn from_name(file_name: &str) -> Option<FileType> {
        let (stem, extension) = file_name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }

        match extension.to_ascii_lowercase().as_str() {
            "txt" | "md" | "log" | "json" | "jsonl" | "yaml" | "yml" | "toml" | "xml" | "ini"
            | "cfg" | "py" | "js" | "ts" | "rs" | "c" | "cpp" | "h" | "java" | "go" | "sh"
            | "css" | "sql" => Some(FileType::Text),
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "ico" => Some(FileType::Image),
            "svg" => Some(FileType::Svg),
            "mp3" | "wav" | "ogg" | "flac" | "m4a" => Some(FileType::Audio),
            "mp4" | "webm" | "ogv" | "mov" => Some(FileType::Video),
            "pdf" => Some(FileType::Pdf),
            "html" | "htm" => Some(FileType::Html),
            "csv" | "tsv" | "parquet" => Some(FileType::Table),
            _ => None,
        }
    }

    /// Whether the preview is the decoded text itself.
    pub fn is_text(&self) -> bool {
        matches!(self, FileType::Text)
    }
}
