use std::collections::HashMap;

use anyhow::Result;
use serde_json::Value;
use tower_lsp::lsp_types::*;

use crate::core::ScanSlot;
use crate::formatting::{SpacesConvertedNotice, TabReplacement, TAB};
use crate::lsp::backend::Backend;
use crate::lsp::document::{relative_file_name, DocumentState};
use crate::lsp::progress::{progress_title, ScanProgress};
use crate::settings::{client, watch_settings_files, ClientSettings, Settings, SettingsEvent};
use crate::validation::{self, validate_document, Span};

/// Source name attached to every published diagnostic
pub const SOURCE: &str = "ucs";

/// Trait for handling diagnostics
#[tower_lsp::async_trait]
pub trait HandleDiagnostics {
    /// Schedule a debounced re-scan of a document
    async fn schedule_scan(&self, uri: Url);
    /// Scan a document now and publish the full diagnostic set
    async fn scan_document(&self, uri: Url, slot: ScanSlot);
    /// Schedule a re-scan of every open UCS document
    async fn rescan_all(&self);
    /// Cancel pending work for a document and clear its diagnostics
    async fn clear_diagnostics(&self, uri: Url);
}

/// Trait for handling the space-to-tab correction
#[tower_lsp::async_trait]
pub trait HandleFormatting {
    async fn apply_tab_replacement(&self, uri: Url, replacement: TabReplacement, tab_size: usize);
}

/// Trait for handling settings changes
#[tower_lsp::async_trait]
pub trait HandleSettings {
    /// Re-read settings files and apply the result
    async fn reload_settings(&self) -> Result<Settings>;
    /// Replace the client settings layer with `value`
    async fn update_client_settings(&self, value: Value);
    /// Pull the `ucs` section with `workspace/configuration`
    async fn fetch_client_settings(&self) -> Value;
    /// Watch settings files and re-scan on change
    async fn start_settings_watcher(&self);
}

#[tower_lsp::async_trait]
impl HandleDiagnostics for Backend {
    async fn schedule_scan(&self, uri: Url) {
        let backend = self.clone();
        let key = uri.clone();
        let mut scheduler = self.scheduler.lock().await;
        scheduler.schedule(key, move |slot| async move {
            backend.scan_document(uri, slot).await;
        });
    }

    async fn scan_document(&self, uri: Url, slot: ScanSlot) {
        // Snapshot the document so the lock isn't held while scanning
        let (content, version, line_count) = {
            let docs = self.documents.lock().await;
            match docs.get(&uri) {
                Some(doc) => (doc.content.clone(), doc.version, doc.line_count()),
                None => return,
            }
        };
        let settings = *self.settings.read().await.current();

        let mut progress = None;
        let mut claim = None;
        if wants_progress(line_count, &settings, self.supports_work_done_progress()) {
            claim = slot.claim_progress();
            if claim.is_some() {
                let folders = self.workspace_folders.read().await.clone();
                let title = progress_title(&relative_file_name(&uri, &folders));
                progress = ScanProgress::begin(&self.client, title).await;
            }
        }

        let result = validate_document(&content, &settings.validation);
        log::debug!(
            "{}: {} errors, {} warnings",
            uri,
            result.error_count(),
            result.warning_count()
        );

        let diagnostics = result
            .diagnostics
            .into_iter()
            .map(|diagnostic| to_lsp_diagnostic(&uri, diagnostic))
            .collect();

        // Hold the lock so a close can't slip between the check and the publish
        let docs = self.documents.lock().await;
        if is_current(&docs, &uri, version) {
            self.client
                .publish_diagnostics(uri, diagnostics, Some(version))
                .await;
        } else {
            log::debug!("dropping stale diagnostics for {} (version {})", uri, version);
        }
        drop(docs);

        if let Some(progress) = progress {
            progress.end().await;
        }
        drop(claim);
    }

    async fn rescan_all(&self) {
        let uris: Vec<Url> = {
            let docs = self.documents.lock().await;
            docs.keys().cloned().collect()
        };

        for uri in uris {
            self.schedule_scan(uri).await;
        }
    }

    async fn clear_diagnostics(&self, uri: Url) {
        self.scheduler.lock().await.cancel(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }
}

#[tower_lsp::async_trait]
impl HandleFormatting for Backend {
    async fn apply_tab_replacement(&self, uri: Url, replacement: TabReplacement, tab_size: usize) {
        let client = self.client.clone();
        let notice = self.notice.clone();

        // Run outside the notification handler so the client can answer
        tokio::spawn(async move {
            let edit = WorkspaceEdit::new(HashMap::from([(
                uri,
                vec![TextEdit::new(replacement_range(&replacement), TAB.to_string())],
            )]));

            match client.apply_edit(edit).await {
                Ok(response) if response.applied => {}
                Ok(response) => {
                    log::debug!("space-to-tab edit not applied: {:?}", response.failure_reason);
                    return;
                }
                Err(e) => {
                    log::warn!("space-to-tab edit failed: {}", e);
                    return;
                }
            }

            if !notice.should_notify() {
                return;
            }

            let actions = [
                SpacesConvertedNotice::DONT_SHOW_AGAIN,
                SpacesConvertedNotice::DISMISS,
            ]
            .into_iter()
            .map(|title| MessageActionItem {
                title: title.to_string(),
                properties: HashMap::new(),
            })
            .collect();

            match client
                .show_message_request(
                    MessageType::INFO,
                    SpacesConvertedNotice::message(tab_size),
                    Some(actions),
                )
                .await
            {
                Ok(choice) => notice.handle_choice(choice.as_ref().map(|item| item.title.as_str())),
                Err(e) => log::debug!("spaces converted notification failed: {}", e),
            }
        });
    }
}

#[tower_lsp::async_trait]
impl HandleSettings for Backend {
    async fn reload_settings(&self) -> Result<Settings> {
        let settings = {
            let mut manager = self.settings.write().await;
            manager.reload().map(|settings| *settings)
        };

        if let Ok(settings) = &settings {
            self.scheduler
                .lock()
                .await
                .set_debounce(std::time::Duration::from_millis(settings.scheduler.debounce_ms));
            self.notice
                .set_enabled(settings.formatting.show_spaces_converted_notification);
        }

        settings
    }

    async fn update_client_settings(&self, value: Value) {
        match ClientSettings::from_value(&value) {
            Ok(client_settings) => {
                self.settings
                    .write()
                    .await
                    .set_client_settings(client_settings);
            }
            Err(e) => {
                self.client
                    .log_message(MessageType::WARNING, format!("{:#}", e))
                    .await;
                return;
            }
        }

        if let Err(e) = self.reload_settings().await {
            self.client
                .log_message(
                    MessageType::ERROR,
                    format!("Failed to load settings: {:#}", e),
                )
                .await;
        }
    }

    async fn fetch_client_settings(&self) -> Value {
        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some(client::SECTION.to_string()),
        }];

        match self.client.configuration(items).await {
            Ok(values) => values.into_iter().next().unwrap_or(Value::Null),
            Err(e) => {
                log::debug!("workspace/configuration failed: {}", e);
                Value::Null
            }
        }
    }

    async fn start_settings_watcher(&self) {
        let files = self.settings.read().await.watched_files();

        let (watcher, mut rx) = match watch_settings_files(&files) {
            Ok(watching) => watching,
            Err(e) => {
                self.client
                    .log_message(
                        MessageType::WARNING,
                        format!("Settings files are not watched: {:#}", e),
                    )
                    .await;
                return;
            }
        };
        log::debug!("watching settings in {:?}", watcher.directories());
        *self.watcher.lock().await = Some(watcher);

        let backend = self.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    SettingsEvent::Changed(path) => {
                        backend
                            .client
                            .log_message(
                                MessageType::INFO,
                                format!("Settings file changed: {}", path.display()),
                            )
                            .await;

                        match backend.reload_settings().await {
                            Ok(_) => backend.rescan_all().await,
                            Err(e) => {
                                backend
                                    .client
                                    .log_message(
                                        MessageType::ERROR,
                                        format!("Failed to load settings: {:#}", e),
                                    )
                                    .await
                            }
                        }
                    }
                    SettingsEvent::Error(e) => {
                        backend
                            .client
                            .log_message(
                                MessageType::ERROR,
                                format!("Settings file watcher error: {}", e),
                            )
                            .await;
                    }
                }
            }
        });
    }
}

/// Whether a scan of `line_count` lines shows a progress indicator
fn wants_progress(line_count: usize, settings: &Settings, supports_progress: bool) -> bool {
    supports_progress && line_count > settings.scheduler.large_file_threshold
}

/// Whether `uri` is still open at `version`
fn is_current(documents: &HashMap<Url, DocumentState>, uri: &Url, version: i32) -> bool {
    documents.get(uri).is_some_and(|doc| doc.version == version)
}

fn span_to_range(span: Span) -> Range {
    Range::new(
        Position::new(span.line, span.start),
        Position::new(span.line, span.end),
    )
}

fn replacement_range(replacement: &TabReplacement) -> Range {
    span_to_range(Span::new(replacement.line, replacement.start, replacement.end))
}

/// Convert a validation diagnostic into its LSP form
pub fn to_lsp_diagnostic(uri: &Url, diagnostic: validation::Diagnostic) -> Diagnostic {
    let severity = match diagnostic.severity {
        validation::Severity::Error => DiagnosticSeverity::ERROR,
        validation::Severity::Warning => DiagnosticSeverity::WARNING,
    };

    let related_information = (!diagnostic.related.is_empty()).then(|| {
        diagnostic
            .related
            .into_iter()
            .map(|related| DiagnosticRelatedInformation {
                location: Location::new(uri.clone(), span_to_range(related.span)),
                message: related.message,
            })
            .collect()
    });

    Diagnostic::new(
        span_to_range(diagnostic.span),
        Some(severity),
        None,
        Some(SOURCE.to_string()),
        diagnostic.message,
        related_information,
        None,
    )
}
