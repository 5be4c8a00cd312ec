use clap::{ Parser, Subcommand };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    // --- Server Args ---
    /// Host address and port for the gateway to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:3000")]
    pub server_addr: String,

    /// Upper bound in seconds for a single upstream provider call.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value = "30")]
    pub upstream_timeout_secs: u64,

    // --- Provider Args ---
    // API keys are not flags: GEMINI_API_KEY, OPENAI_API_KEY and ANTHROPIC_API_KEY
    // are read from the environment on every request.
    /// Base URL for Gemini models (the model and `:generateContent` are appended).
    #[arg(long, env = "GEMINI_BASE_URL", default_value = crate::llm::chat::gemini::DEFAULT_BASE_URL)]
    pub gemini_base_url: String,

    /// Gemini model name.
    #[arg(long, env = "GEMINI_MODEL", default_value = crate::llm::chat::gemini::DEFAULT_MODEL)]
    pub gemini_model: String,

    /// Base URL for the OpenAI API (`/chat/completions` is appended).
    #[arg(long, env = "OPENAI_BASE_URL", default_value = crate::llm::chat::openai::DEFAULT_BASE_URL)]
    pub openai_base_url: String,

    /// OpenAI chat model name.
    #[arg(long, env = "OPENAI_MODEL", default_value = crate::llm::chat::openai::DEFAULT_MODEL)]
    pub openai_model: String,

    /// Base URL for the Anthropic API (`/messages` is appended).
    #[arg(long, env = "ANTHROPIC_BASE_URL", default_value = crate::llm::chat::anthropic::DEFAULT_BASE_URL)]
    pub anthropic_base_url: String,

    /// Anthropic model name.
    #[arg(long, env = "ANTHROPIC_MODEL", default_value = crate::llm::chat::anthropic::DEFAULT_MODEL)]
    pub anthropic_model: String,

    // --- Mock Provider Args ---
    /// Lower bound of the simulated mock latency in milliseconds.
    #[arg(long, env = "MOCK_DELAY_MIN_MS", default_value = "1000")]
    pub mock_delay_min_ms: u64,

    /// Upper bound of the simulated mock latency in milliseconds.
    #[arg(long, env = "MOCK_DELAY_MAX_MS", default_value = "3000")]
    pub mock_delay_max_ms: u64,

    // --- TLS Args ---
    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP chat gateway (default).
    Serve,
    /// Talk to a running gateway from the terminal.
    Chat(ChatArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChatArgs {
    /// Gateway chat endpoint.
    #[arg(long, env = "CHAT_ENDPOINT", default_value = crate::widget::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Provider to request (gemini, openai, anthropic, mock).
    #[arg(long, default_value = "mock")]
    pub provider: String,

    /// API key forwarded with each request. When absent the gateway uses its own environment.
    #[arg(long)]
    pub api_key: Option<String>,

    /// First assistant turn shown before any input.
    #[arg(long, default_value = crate::widget::DEFAULT_WELCOME_MESSAGE)]
    pub welcome_message: String,

    /// Send a single message and exit. Without it an interactive session starts.
    pub message: Option<String>,
}
