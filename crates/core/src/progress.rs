//! Human-facing progress notifications for long-running jobs.
//!
//! Notifications are observational only. They carry no completion fraction
//! and nothing in the crate depends on them being delivered.

use crate::types::Locale;

/// Which step of the video workflow a notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    CheckingCredential,
    SelectCredential,
    Initializing,
    Started,
    /// Emitted once per poll iteration, before the wait.
    Polling {
        attempt: usize,
    },
    Downloading,
    CredentialRejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub stage: ProgressStage,
    pub message: String,
}

/// Receives progress updates. Called synchronously from the job's task, so
/// implementations must return quickly.
pub trait ProgressNotifier: Send + Sync {
    fn notify(&self, update: &ProgressUpdate);
}

impl<F> ProgressNotifier for F
where
    F: Fn(&ProgressUpdate) + Send + Sync,
{
    fn notify(&self, update: &ProgressUpdate) {
        self(update)
    }
}

/// Discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ProgressNotifier for NoopNotifier {
    fn notify(&self, _update: &ProgressUpdate) {}
}

/// The strings emitted for each stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressMessages {
    pub checking_credential: String,
    pub select_credential: String,
    pub initializing: String,
    pub started: String,
    /// Cycled through while polling, wrapping around when the job outlasts it.
    pub polling: Vec<String>,
    pub downloading: String,
    pub credential_rejected: String,
}

impl ProgressMessages {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => Self::english(),
            Locale::Fr => Self::french(),
        }
    }

    pub fn english() -> Self {
        Self {
            checking_credential: "Checking API key...".into(),
            select_credential: "Please select an API key to generate videos.".into(),
            initializing: "Initializing video generation...".into(),
            started: "Video generation has started. This can take a few minutes; we will check the status periodically.".into(),
            polling: vec![
                "Analyzing your prompt...".into(),
                "Composing the initial scenes...".into(),
                "Rendering high-quality frames...".into(),
                "Adding the finishing touches...".into(),
                "Almost done, finalizing the video...".into(),
            ],
            downloading: "Fetching the generated video...".into(),
            credential_rejected: "API key error. Please try selecting your API key again.".into(),
        }
    }

    pub fn french() -> Self {
        Self {
            checking_credential: "Vérification de la clé API...".into(),
            select_credential: "Veuillez sélectionner une clé API pour générer des vidéos.".into(),
            initializing: "Initialisation de la génération de la vidéo...".into(),
            started: "La génération de la vidéo a commencé. Cela peut prendre quelques minutes. Nous vérifierons le statut périodiquement.".into(),
            polling: vec![
                "Analyse de votre prompt...".into(),
                "Composition des scènes initiales...".into(),
                "Rendu des images en haute qualité...".into(),
                "Ajout des touches finales...".into(),
                "Presque terminé, finalisation de la vidéo...".into(),
            ],
            downloading: "Récupération de la vidéo générée...".into(),
            credential_rejected: "Erreur de clé API. Veuillez essayer de sélectionner à nouveau votre clé API.".into(),
        }
    }

    /// Phrase for the given poll attempt (`attempt mod len`), or `None` when
    /// the list is empty.
    pub fn polling_phrase(&self, attempt: usize) -> Option<&str> {
        if self.polling.is_empty() {
            return None;
        }
        Some(self.polling[attempt % self.polling.len()].as_str())
    }

    /// Build the update for a stage. Returns `None` for a polling stage when
    /// no phrases are configured.
    pub fn update(&self, stage: ProgressStage) -> Option<ProgressUpdate> {
        let message = match stage {
            ProgressStage::CheckingCredential => self.checking_credential.as_str(),
            ProgressStage::SelectCredential => self.select_credential.as_str(),
            ProgressStage::Initializing => self.initializing.as_str(),
            ProgressStage::Started => self.started.as_str(),
            ProgressStage::Polling { attempt } => self.polling_phrase(attempt)?,
            ProgressStage::Downloading => self.downloading.as_str(),
            ProgressStage::CredentialRejected => self.credential_rejected.as_str(),
        };
        Some(ProgressUpdate {
            stage,
            message: message.to_string(),
        })
    }
}

impl Default for ProgressMessages {
    fn default() -> Self {
        Self::english()
    }
}
