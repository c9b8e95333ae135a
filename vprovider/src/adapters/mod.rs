pub mod cloudflare;
pub mod ollama;
pub mod placeholder;
