use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "attar")]
#[command(version)]
#[command(about = "Read model attachment archives over HTTP Range requests", long_about = None)]
#[command(after_help = "Examples:\n  \
  attar -l model.dfpack                          list attachments of a local model\n  \
  attar -v https://bucket.example.com/model      list with sizes from a remote bucket\n  \
  attar model.dfpack plots/loss.png -d out       download one attachment into out/\n  \
  attar -p model.dfpack logs/train.log           print a text attachment to stdout")]
pub struct Cli {
    /// Model storage object path or HTTP URL
    #[arg(value_name = "OBJECT")]
    pub object: String,

    /// Attachment paths to preview or download (default: none)
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// Model-level file index JSON (default: <OBJECT>.index.json)
    #[arg(long = "model-index", value_name = "FILE")]
    pub model_index: Option<String>,

    /// List attachments (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List attachments with sizes
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Print preview text to stdout, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Download selected files into DIR
    #[arg(short = 'd', value_name = "DIR")]
    pub download_dir: Option<String>,

    /// Quiet mode
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.object.starts_with("http://") || self.object.starts_with("https://")
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    /// Where the model-level index lives, by the sidecar naming convention
    /// unless overridden.
    pub fn model_index_source(&self) -> String {
        self.model_index
            .clone()
            .unwrap_or_else(|| format!("{}.index.json", self.object))
    }
}
