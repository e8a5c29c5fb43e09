use async_trait::async_trait;

use super::controller::SpeechService;
use super::state::BackendEvent;
use crate::client::{ClientError, GenerateReply, GenerateRequest, SpeechClient};

/// [`SpeechService`] that runs requests on the tokio runtime and hands the
/// reply back to the GTK main thread.
pub struct RuntimeService {
    client: SpeechClient,
    runtime: tokio::runtime::Handle,
}

impl RuntimeService {
    pub fn new(client: SpeechClient, runtime: tokio::runtime::Handle) -> Self {
        Self { client, runtime }
    }
}

#[async_trait(?Send)]
impl SpeechService for RuntimeService {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateReply, ClientError> {
        // reqwest needs a tokio reactor; the GTK loop only awaits the channel.
        let (tx, rx) = async_channel::bounded(1);
        let client = self.client.clone();

        self.runtime.spawn(async move {
            let reply = client.generate(&request).await;
            let _ = tx.send(reply).await;
        });

        rx.recv().await.unwrap_or(Err(ClientError::Aborted))
    }

    fn resolve(&self, reference: &str) -> String {
        SpeechService::resolve(&self.client, reference)
    }

    fn download_url(&self, filename: &str) -> Option<String> {
        SpeechService::download_url(&self.client, filename)
    }
}

/// Fetch the voice catalog and model status in the background.
pub fn fetch_server_info(
    runtime: &tokio::runtime::Runtime,
    client: SpeechClient,
    sender: async_channel::Sender<BackendEvent>,
) {
    let voices_client = client.clone();
    let voices_sender = sender.clone();
    runtime.spawn(async move {
        match voices_client.voices().await {
            Ok(voices) => {
                log::info!("Server offers {} voices", voices.len());
                let _ = voices_sender.send(BackendEvent::VoicesLoaded(voices)).await;
            }
            Err(e) => log::warn!("Could not fetch voice list, using built-in voices: {e}"),
        }
    });

    runtime.spawn(async move {
        match client.model_status().await {
            Ok(status) => {
                let _ = sender.send(BackendEvent::ModelStatusLoaded(status)).await;
            }
            Err(e) => log::warn!("Could not fetch model status: {e}"),
        }
    });
}
