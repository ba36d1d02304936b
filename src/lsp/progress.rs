//! Work-done progress shown while large documents are scanned.
//!
//! The indicator is informational only; it cannot be cancelled.

use std::sync::atomic::{AtomicU64, Ordering};

use tower_lsp::lsp_types::notification::Progress;
use tower_lsp::lsp_types::request::WorkDoneProgressCreate;
use tower_lsp::lsp_types::{
    NumberOrString, ProgressParams, ProgressParamsValue, ProgressToken, WorkDoneProgress,
    WorkDoneProgressBegin, WorkDoneProgressCreateParams, WorkDoneProgressEnd,
};
use tower_lsp::Client;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

pub fn progress_title(file_name: &str) -> String {
    format!("[Large file] Processing {}...", file_name)
}

/// An active progress indicator
#[derive(Debug)]
pub struct ScanProgress {
    client: Client,
    token: ProgressToken,
}

impl ScanProgress {
    /// Ask the client to create a progress indicator and start it.
    ///
    /// Returns `None` when the client refuses or fails the request.
    pub async fn begin(client: &Client, title: String) -> Option<Self> {
        let token = NumberOrString::String(format!(
            "ucs-scan-{}",
            NEXT_TOKEN.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(e) = client
            .send_request::<WorkDoneProgressCreate>(WorkDoneProgressCreateParams {
                token: token.clone(),
            })
            .await
        {
            log::debug!("work done progress refused: {}", e);
            return None;
        }

        client
            .send_notification::<Progress>(ProgressParams {
                token: token.clone(),
                value: ProgressParamsValue::WorkDone(WorkDoneProgress::Begin(
                    WorkDoneProgressBegin {
                        title,
                        cancellable: Some(false),
                        message: None,
                        percentage: None,
                    },
                )),
            })
            .await;

        Some(Self {
            client: client.clone(),
            token,
        })
    }

    pub async fn end(self) {
        self.client
            .send_notification::<Progress>(ProgressParams {
                token: self.token,
                value: ProgressParamsValue::WorkDone(WorkDoneProgress::End(WorkDoneProgressEnd {
                    message: None,
                })),
            })
            .await;
    }
}
