//! Providers - wire format and transport for the generative model API.

pub mod gemini;
pub mod sse;
pub mod transport;

pub use gemini::{
    Content, GeminiClient, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
pub use transport::{ModelTransport, ResponseStream};
