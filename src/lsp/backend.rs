use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::core::ScanScheduler;
use crate::formatting::{space_to_tab_for_changes, SpaceInsertion, SpacesConvertedNotice};
use crate::lsp::document::DocumentState;
use crate::lsp::handlers::{HandleDiagnostics, HandleFormatting, HandleSettings};
use crate::settings::{ClientSettings, SettingsManager, SettingsWatcher};
use crate::Config;

/// The main LSP backend that holds state and implements the Language Server Protocol
#[derive(Clone)]
pub struct Backend {
    pub client: Client,
    pub documents: Arc<Mutex<HashMap<Url, DocumentState>>>,
    pub settings: Arc<RwLock<SettingsManager>>,
    pub scheduler: Arc<Mutex<ScanScheduler<Url>>>,
    pub notice: Arc<SpacesConvertedNotice>,
    pub workspace_folders: Arc<RwLock<Vec<Url>>>,
    pub watcher: Arc<Mutex<Option<SettingsWatcher>>>,
    work_done_progress: Arc<AtomicBool>,
}

impl Backend {
    pub fn new(client: Client, config: Config) -> Self {
        let settings = SettingsManager::new(&config);
        let current = *settings.current();

        Self {
            client,
            documents: Arc::new(Mutex::new(HashMap::new())),
            settings: Arc::new(RwLock::new(settings)),
            scheduler: Arc::new(Mutex::new(ScanScheduler::new(Duration::from_millis(
                current.scheduler.debounce_ms,
            )))),
            notice: Arc::new(SpacesConvertedNotice::new(
                current.formatting.show_spaces_converted_notification,
            )),
            workspace_folders: Arc::new(RwLock::new(Vec::new())),
            watcher: Arc::new(Mutex::new(None)),
            work_done_progress: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the client announced `window.workDoneProgress`
    pub fn supports_work_done_progress(&self) -> bool {
        self.work_done_progress.load(Ordering::Relaxed)
    }
}

fn workspace_folders(params: &InitializeParams) -> Vec<Url> {
    if let Some(folders) = &params.workspace_folders {
        if !folders.is_empty() {
            return folders.iter().map(|folder| folder.uri.clone()).collect();
        }
    }

    #[allow(deprecated)]
    params.root_uri.iter().cloned().collect()
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> tower_lsp::jsonrpc::Result<InitializeResult> {
        let folders = workspace_folders(&params);
        let work_done_progress = params
            .capabilities
            .window
            .as_ref()
            .and_then(|window| window.work_done_progress)
            .unwrap_or(false);
        self.work_done_progress
            .store(work_done_progress, Ordering::Relaxed);

        {
            let mut settings = self.settings.write().await;
            if let Some(root) = folders.first().and_then(|uri| uri.to_file_path().ok()) {
                settings.set_workspace_root(&root);
            }
            if let Some(options) = &params.initialization_options {
                match ClientSettings::from_value(options) {
                    Ok(client_settings) => settings.set_client_settings(client_settings),
                    Err(e) => log::warn!("ignoring initialization options: {:#}", e),
                }
            }
        }
        *self.workspace_folders.write().await = folders;

        // Only log locally; nothing may precede the initialize response
        if let Err(e) = self.reload_settings().await {
            log::warn!("Failed to load settings: {:#}", e);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "ucs-language-server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "ucs-language-server initialized")
            .await;

        self.start_settings_watcher().await;
    }

    async fn shutdown(&self) -> tower_lsp::jsonrpc::Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        let uri = document.uri;
        let state = DocumentState::new(document.text, document.version, document.language_id);

        if !state.is_ucs(&uri) {
            log::debug!("ignoring {} ({})", uri, state.language_id);
            return;
        }

        let mut docs = self.documents.lock().await;
        docs.insert(uri.clone(), state);
        drop(docs); // Release the lock before scheduling the scan

        self.schedule_scan(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let tab_size = self.settings.read().await.current().formatting.tab_size;

        let replacement = {
            let mut docs = self.documents.lock().await;
            let Some(doc) = docs.get_mut(&uri) else {
                return;
            };

            for change in &params.content_changes {
                doc.apply_change(change, version);
            }

            let insertions: Vec<SpaceInsertion<'_>> = params
                .content_changes
                .iter()
                .filter_map(|change| {
                    let start = change.range?.start;
                    Some(SpaceInsertion {
                        line: start.line,
                        character: start.character,
                        inserted: &change.text,
                        line_text: doc.line(start.line as usize)?,
                        tab_size,
                    })
                })
                .collect();

            // Full-text changes carry no insertion point
            if insertions.len() == params.content_changes.len() {
                space_to_tab_for_changes(&insertions)
            } else {
                None
            }
        };

        if let Some(replacement) = replacement {
            self.apply_tab_replacement(uri.clone(), replacement, tab_size)
                .await;
        }

        self.schedule_scan(uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        let removed = self.documents.lock().await.remove(&uri).is_some();
        if removed {
            self.clear_diagnostics(uri).await;
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let value = if ClientSettings::is_present_in(&params.settings) {
            params.settings
        } else {
            self.fetch_client_settings().await
        };

        self.update_client_settings(value).await;
        self.rescan_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_folders_prefer_folders_over_root() {
        let folder = Url::parse("file:///work/game").unwrap();
        #[allow(deprecated)]
        let params = InitializeParams {
            root_uri: Some(Url::parse("file:///work").unwrap()),
            workspace_folders: Some(vec![WorkspaceFolder {
                uri: folder.clone(),
                name: "game".to_string(),
            }]),
            ..Default::default()
        };
        assert_eq!(workspace_folders(&params), vec![folder]);
    }

    #[test]
    fn test_workspace_folders_fall_back_to_root() {
        let root = Url::parse("file:///work").unwrap();
        #[allow(deprecated)]
        let params = InitializeParams {
            root_uri: Some(root.clone()),
            ..Default::default()
        };
        assert_eq!(workspace_folders(&params), vec![root]);
        assert!(workspace_folders(&InitializeParams::default()).is_empty());
    }
}
