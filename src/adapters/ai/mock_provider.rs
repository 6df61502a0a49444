//! Mock AI provider for testing.
//!
//! Configurable to return queued replies and extraction values, or to inject
//! errors, so tests exercise the engine without a real backend.

use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{
    AiError, AiProvider, ExtractionRequest, ProviderInfo, ReplyChunk, ReplyRequest, ReplyStream,
};

enum QueuedReply {
    Content(String),
    Error(String),
}

enum QueuedExtraction {
    Value(serde_json::Value),
    Error(String),
}

/// Mock AI provider with queued responses and call tracking.
#[derive(Clone)]
pub struct MockAiProvider {
    replies: Arc<Mutex<VecDeque<QueuedReply>>>,
    extractions: Arc<Mutex<VecDeque<QueuedExtraction>>>,
    extraction_call_count: Arc<Mutex<usize>>,
    reply_call_count: Arc<Mutex<usize>>,
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAiProvider {
    /// Creates an empty mock; calls against empty queues fail loudly.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            extractions: Arc::new(Mutex::new(VecDeque::new())),
            extraction_call_count: Arc::new(Mutex::new(0)),
            reply_call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Queues a reply to be streamed word by word.
    pub fn with_reply(self, content: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(QueuedReply::Content(content.into()));
        self
    }

    /// Queues a reply-call failure.
    pub fn with_reply_error(self, message: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(QueuedReply::Error(message.into()));
        self
    }

    /// Queues a structured-extraction response.
    pub fn with_extraction(self, value: serde_json::Value) -> Self {
        self.extractions
            .lock()
            .unwrap()
            .push_back(QueuedExtraction::Value(value));
        self
    }

    /// Queues an extraction-call failure.
    pub fn with_extraction_error(self, message: impl Into<String>) -> Self {
        self.extractions
            .lock()
            .unwrap()
            .push_back(QueuedExtraction::Error(message.into()));
        self
    }

    /// Number of extraction calls made against this mock.
    pub fn extraction_calls(&self) -> usize {
        *self.extraction_call_count.lock().unwrap()
    }

    /// Number of reply calls made against this mock.
    pub fn reply_calls(&self) -> usize {
        *self.reply_call_count.lock().unwrap()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn stream_reply(&self, _request: ReplyRequest) -> Result<ReplyStream, AiError> {
        *self.reply_call_count.lock().unwrap() += 1;
        let queued = self.replies.lock().unwrap().pop_front();
        match queued {
            Some(QueuedReply::Content(content)) => {
                // Stream word by word to exercise chunk assembly.
                let mut chunks: Vec<Result<ReplyChunk, AiError>> = Vec::new();
                let words: Vec<&str> = content.split_inclusive(' ').collect();
                for word in words {
                    chunks.push(Ok(ReplyChunk::content(word)));
                }
                chunks.push(Ok(ReplyChunk::final_chunk()));
                Ok(Box::pin(stream::iter(chunks)))
            }
            Some(QueuedReply::Error(message)) => Err(AiError::unavailable(message)),
            None => Err(AiError::unavailable("mock: no queued reply")),
        }
    }

    async fn extract_structured(
        &self,
        _request: ExtractionRequest,
    ) -> Result<serde_json::Value, AiError> {
        *self.extraction_call_count.lock().unwrap() += 1;
        let queued = self.extractions.lock().unwrap().pop_front();
        match queued {
            Some(QueuedExtraction::Value(value)) => Ok(value),
            Some(QueuedExtraction::Error(message)) => Err(AiError::unavailable(message)),
            None => Err(AiError::unavailable("mock: no queued extraction")),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "mock-model-1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn streams_queued_reply_and_counts_calls() {
        let provider = MockAiProvider::new().with_reply("hello there friend");

        let request = ReplyRequest::new("prompt", vec![]);
        let mut stream = provider.stream_reply(request).await.unwrap();

        let mut assembled = String::new();
        while let Some(chunk) = stream.next().await {
            assembled.push_str(&chunk.unwrap().delta);
        }
        assert_eq!(assembled, "hello there friend");
        assert_eq!(provider.reply_calls(), 1);
    }

    #[tokio::test]
    async fn extraction_queue_is_consumed_in_order() {
        let provider = MockAiProvider::new()
            .with_extraction(serde_json::json!({"first": true}))
            .with_extraction(serde_json::json!({"second": true}));

        let request = ExtractionRequest::new("p", serde_json::json!({}));
        let first = provider.extract_structured(request.clone()).await.unwrap();
        let second = provider.extract_structured(request).await.unwrap();

        assert_eq!(first["first"], true);
        assert_eq!(second["second"], true);
        assert_eq!(provider.extraction_calls(), 2);
    }

    #[tokio::test]
    async fn empty_queues_fail_loudly() {
        let provider = MockAiProvider::new();
        let request = ExtractionRequest::new("p", serde_json::json!({}));
        assert!(provider.extract_structured(request).await.is_err());
    }

    #[tokio::test]
    async fn queued_errors_surface_as_unavailable() {
        let provider = MockAiProvider::new().with_reply_error("down for maintenance");
        let result = provider.stream_reply(ReplyRequest::new("p", vec![])).await;
        assert!(matches!(result, Err(AiError::Unavailable { .. })));
    }
}
