use async_trait::async_trait;
use futures::stream::BoxStream;
use shared::error::GatewayError;

use crate::gemini::{GenerateContentRequest, GenerateContentResponse};

/// Streamed reply: one envelope per server event, in arrival order.
/// Dropping the stream abandons the underlying request.
pub type ResponseStream = BoxStream<'static, Result<GenerateContentResponse, GatewayError>>;

/// Boundary between the gateway and whatever carries requests to the model.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GatewayError>;

    /// Fails before yielding anything if the stream cannot be opened.
    async fn stream(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<ResponseStream, GatewayError>;
}
