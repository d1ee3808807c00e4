use clap::{ Parser, Subcommand };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the scope-gated completion proxy.
    Serve(ServeArgs),
    /// Chat with the proxy from the terminal.
    Chat(ChatArgs),
    /// Print the stored conversation as HTML chat bubbles.
    Transcript(TranscriptArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Host address and port for the proxy to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:8787")]
    pub server_addr: String,

    // --- Upstream Provider Args ---
    /// Bearer credential for the upstream completion API. Never sent to clients.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Full URL of the upstream chat-completions endpoint.
    #[arg(long, env = "UPSTREAM_URL", default_value = "https://api.openai.com/v1/chat/completions")]
    pub upstream_url: String,

    /// Model answering in-scope questions.
    #[arg(long, env = "COMPLETION_MODEL", default_value = "gpt-4o")]
    pub completion_model: String,

    /// Token budget for answers.
    #[arg(long, env = "COMPLETION_MAX_TOKENS", default_value = "300")]
    pub completion_max_tokens: u32,

    /// Small model deciding whether a question is in scope.
    #[arg(long, env = "CLASSIFIER_MODEL", default_value = "gpt-4o-mini")]
    pub classifier_model: String,

    /// Token budget for the classifier verdict.
    #[arg(long, env = "CLASSIFIER_MAX_TOKENS", default_value = "60")]
    pub classifier_max_tokens: u32,

    /// Per-request timeout for upstream calls, in seconds.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value = "60")]
    pub upstream_timeout_secs: u64,

    // --- General App Args ---
    /// Optional JSON file overriding brand, directive, classifier and refusal texts.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChatArgs {
    /// URL of the deployed proxy. Requests fail with an error bubble when unset.
    #[arg(long, env = "WORKER_URL")]
    pub worker_url: Option<String>,

    /// Client storage backend (file, memory)
    #[arg(long, env = "STORAGE_TYPE", default_value = "file")]
    pub storage_type: String,

    /// Location of the JSON file used by the file storage backend.
    #[arg(long, env = "STORAGE_PATH", default_value = "chat_storage.json")]
    pub storage_path: String,

    /// Optional JSON file overriding the system directive and greeting.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct TranscriptArgs {
    /// Location of the JSON file written by `chat`.
    #[arg(long, env = "STORAGE_PATH", default_value = "chat_storage.json")]
    pub storage_path: String,
}
