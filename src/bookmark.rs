//! Interactive bookmarking of maps, modes and match films.
//!
//! The flow is a loop over [`Step`]: any recoverable failure prints a notice
//! and drops back to the bookmark menu instead of recursing into it.

use anyhow::Result;
use thiserror::Error;

use crate::client::{ApiError, BookmarkCategory, GamePlatform, MatchStats};
use crate::guid::{extract_guid, GuidError};
use crate::identity::{Identity, IdentityProvider};
use crate::menu::Navigate;
use crate::prompts::{PromptError, Prompter};

const BOOKMARK_MAP: &str = "Bookmark a map";
const BOOKMARK_MODE: &str = "Bookmark a mode";
const BOOKMARK_FILM: &str = "Bookmark a match film";
const GO_BACK: &str = "Go back";

const FROM_MATCH: &str = "Yes please!";
const MANUAL_ENTRY: &str = "No, I know what I'm doing.";

const INVALID_INPUT: &str = "❌ Invalid input...";
const INVALID_MATCH: &str = "❌ Invalid match ID...";
const FILM_UNAVAILABLE: &str = "❌ Film not available...";
const BOOKMARK_FAILED: &str = "❌ Failed to bookmark the desired file...";
const CLONE_FAILED: &str = "❌ Failed to clone the desired file...";
const SOMETHING_WRONG: &str = "❌ Something went wrong...";
const BOOKMARKED: &str = "🎉 Bookmarked with success!";
const CLONED: &str = "🎉 Cloned with success!";

/// An asset to bookmark. Cloning needs the version, bookmarking a published
/// asset does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub asset_id: String,
    pub version_id: Option<String>,
}

/// The two UGC variants a match carries; films are resolved separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VariantKind {
    Map,
    GameVariant,
}

impl VariantKind {
    fn category(self) -> BookmarkCategory {
        match self {
            VariantKind::Map => BookmarkCategory::Maps,
            VariantKind::GameVariant => BookmarkCategory::UgcGameVariants,
        }
    }
}

#[derive(Debug, Error)]
enum CaptureError {
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    InvalidGuid(#[from] GuidError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Film,
    ChooseSource(VariantKind),
    EnterAssets(VariantKind),
    FromMatch(VariantKind),
    Bookmark {
        category: BookmarkCategory,
        asset: AssetReference,
    },
    CloneFallback {
        category: BookmarkCategory,
        asset_id: String,
        version_id: String,
    },
}

enum Flow {
    Next(Step),
    /// Back to the bookmark menu.
    Restart,
    Leave(Navigate),
}

pub struct BookmarkFlow<'a> {
    prompter: &'a mut dyn Prompter,
    platform: &'a dyn GamePlatform,
    identities: &'a dyn IdentityProvider,
}

impl<'a> BookmarkFlow<'a> {
    pub fn new(
        prompter: &'a mut dyn Prompter,
        platform: &'a dyn GamePlatform,
        identities: &'a dyn IdentityProvider,
    ) -> Self {
        Self {
            prompter,
            platform,
            identities,
        }
    }

    /// Run until the user bookmarks something or backs out.
    ///
    /// A missing identity and terminal failures are returned as errors;
    /// everything else is reported inline and restarts the menu.
    pub async fn run(&mut self) -> Result<Navigate> {
        loop {
            let first = match self.menu()? {
                Some(step) => step,
                None => return Ok(Navigate::Base),
            };
            let identity = self.identities.active_identity()?;

            let mut step = first;
            loop {
                tracing::debug!(?step, "bookmark flow step");
                step = match self.advance(step, &identity).await? {
                    Flow::Next(next) => next,
                    Flow::Restart => break,
                    Flow::Leave(target) => return Ok(target),
                };
            }
        }
    }

    fn menu(&mut self) -> Result<Option<Step>> {
        let options = [BOOKMARK_MAP, BOOKMARK_MODE, BOOKMARK_FILM, GO_BACK];
        let choice = match self.prompter.select("What would you like to bookmark?", &options) {
            Ok(index) => options[index],
            Err(PromptError::Cancelled) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        Ok(match choice {
            BOOKMARK_MAP => Some(Step::ChooseSource(VariantKind::Map)),
            BOOKMARK_MODE => Some(Step::ChooseSource(VariantKind::GameVariant)),
            BOOKMARK_FILM => Some(Step::Film),
            _ => None,
        })
    }

    async fn advance(&mut self, step: Step, identity: &Identity) -> Result<Flow> {
        match step {
            Step::Film => self.film(identity).await,
            Step::ChooseSource(kind) => self.choose_source(kind),
            Step::EnterAssets(kind) => match self.capture_asset_ids() {
                Ok(asset) => Ok(Flow::Next(Step::Bookmark {
                    category: kind.category(),
                    asset,
                })),
                Err(err) => self.recover(err),
            },
            Step::FromMatch(kind) => self.from_match(kind, identity).await,
            Step::Bookmark { category, asset } => self.bookmark(category, asset, identity).await,
            Step::CloneFallback {
                category,
                asset_id,
                version_id,
            } => {
                self.clone_fallback(category, &asset_id, &version_id, identity)
                    .await
            }
        }
    }

    fn recover(&mut self, err: CaptureError) -> Result<Flow> {
        match err {
            CaptureError::Prompt(PromptError::Cancelled) => {}
            CaptureError::Prompt(err) => return Err(err.into()),
            CaptureError::InvalidGuid(err) => {
                tracing::debug!(%err, "rejected identifier");
                self.prompter.say(INVALID_INPUT);
            }
        }
        Ok(Flow::Restart)
    }

    fn capture_match_id(&mut self) -> Result<String, CaptureError> {
        let value = self.prompter.text(
            "Please specify a match ID or a valid match URL",
            "Leafapp.co, SpartanRecord.com, HaloDataHive.com and such are supported",
            None,
        )?;
        Ok(extract_guid(&value)?)
    }

    fn capture_asset_ids(&mut self) -> Result<AssetReference, CaptureError> {
        let asset_id = self.prompter.text(
            "Please specify a \"AssetID\" (GUID)",
            "e.g., ae4daed6-251a-4c2f-bc6f-eb25eac1bfd1",
            Some(validate_guid),
        )?;
        let version_id = self.prompter.text(
            "Please specify a \"AssetVariantID\" (GUID)",
            "This value is optional for published files",
            None,
        )?;
        Ok(parse_asset_input(&asset_id, &version_id)?)
    }

    fn choose_source(&mut self, kind: VariantKind) -> Result<Flow> {
        let options = [FROM_MATCH, MANUAL_ENTRY];
        match self.prompter.select(
            "Would you like to bookmark the asset from an existing match?",
            &options,
        ) {
            Ok(0) => Ok(Flow::Next(Step::FromMatch(kind))),
            Ok(_) => Ok(Flow::Next(Step::EnterAssets(kind))),
            Err(PromptError::Cancelled) => Ok(Flow::Restart),
            Err(err) => Err(err.into()),
        }
    }

    async fn from_match(&mut self, kind: VariantKind, identity: &Identity) -> Result<Flow> {
        let match_id = match self.capture_match_id() {
            Ok(id) => id,
            Err(err) => return self.recover(err),
        };

        let spinner = self.prompter.busy("Fetching...");
        let stats = self
            .platform
            .match_stats(&identity.spartan_token, &match_id)
            .await;
        spinner.finish_and_clear();

        let stats = match stats {
            Ok(stats) => stats,
            Err(err) => {
                tracing::warn!(%match_id, %err, "failed to fetch match stats");
                self.prompter.say(INVALID_MATCH);
                return Ok(Flow::Restart);
            }
        };

        let asset = derive_asset(&stats, kind);
        let category = kind.category();
        self.prompter
            .say(&variant_summary(&stats.match_id, category, &asset));
        Ok(Flow::Next(Step::Bookmark { category, asset }))
    }

    async fn film(&mut self, identity: &Identity) -> Result<Flow> {
        let match_id = match self.capture_match_id() {
            Ok(id) => id,
            Err(err) => return self.recover(err),
        };

        let spinner = self.prompter.busy("Fetching...");
        let stats = match self
            .platform
            .match_stats(&identity.spartan_token, &match_id)
            .await
        {
            Ok(stats) => stats,
            Err(err) => {
                spinner.finish_and_clear();
                tracing::warn!(%match_id, %err, "failed to fetch match stats");
                self.prompter.say(INVALID_MATCH);
                return Ok(Flow::Restart);
            }
        };
        let film = self
            .platform
            .match_film(&identity.spartan_token, &match_id)
            .await;
        spinner.finish_and_clear();

        let film = match film {
            Ok(film) => film,
            Err(err) => {
                tracing::warn!(%match_id, %err, "film not available");
                self.prompter.say(FILM_UNAVAILABLE);
                return Ok(Flow::Restart);
            }
        };

        self.prompter.say(&format!(
            "Match Details (ID: {})\n│ Film\n└── Asset ID: {}",
            stats.match_id, film.asset_id
        ));
        Ok(Flow::Next(Step::Bookmark {
            category: BookmarkCategory::Films,
            asset: AssetReference {
                asset_id: film.asset_id,
                version_id: None,
            },
        }))
    }

    async fn bookmark(
        &mut self,
        category: BookmarkCategory,
        asset: AssetReference,
        identity: &Identity,
    ) -> Result<Flow> {
        let spinner = self.prompter.busy("Bookmarking...");

        // Films are addressed by match and have no published/unpublished state.
        if category != BookmarkCategory::Films {
            let ping = self
                .platform
                .ping_published_asset(&identity.spartan_token, category, &asset.asset_id)
                .await;

            match (ping, asset.version_id.as_deref()) {
                (Ok(()), _) => {}
                (Err(ApiError::NotFound), Some(version_id)) => {
                    spinner.finish_and_clear();
                    return Ok(Flow::Next(Step::CloneFallback {
                        category,
                        asset_id: asset.asset_id.clone(),
                        version_id: version_id.to_string(),
                    }));
                }
                (Err(ApiError::NotFound), None) => {
                    spinner.finish_and_clear();
                    tracing::warn!(asset_id = %asset.asset_id, %category, "asset is not published");
                    self.prompter.say(BOOKMARK_FAILED);
                    return Ok(Flow::Restart);
                }
                (Err(err), _) => {
                    spinner.finish_and_clear();
                    tracing::warn!(asset_id = %asset.asset_id, %category, %err, "publication check failed");
                    self.prompter.say(SOMETHING_WRONG);
                    return Ok(Flow::Restart);
                }
            }
        }

        let result = self
            .platform
            .bookmark(
                &identity.xuid,
                &identity.spartan_token,
                category,
                &asset.asset_id,
                asset.version_id.as_deref(),
            )
            .await;
        spinner.finish_and_clear();

        match result {
            Ok(()) => {
                self.prompter.say(BOOKMARKED);
                Ok(Flow::Leave(Navigate::Base))
            }
            Err(err) => {
                tracing::warn!(asset_id = %asset.asset_id, %category, %err, "bookmark failed");
                self.prompter.say(SOMETHING_WRONG);
                Ok(Flow::Restart)
            }
        }
    }

    async fn clone_fallback(
        &mut self,
        category: BookmarkCategory,
        asset_id: &str,
        version_id: &str,
        identity: &Identity,
    ) -> Result<Flow> {
        let accepted = match self.prompter.confirm(
            "The desired asset is not published; would you like to try cloning it in your files instead?",
            true,
        ) {
            Ok(accepted) => accepted,
            Err(PromptError::Cancelled) => false,
            Err(err) => return Err(err.into()),
        };
        if !accepted {
            return Ok(Flow::Restart);
        }

        let spinner = self.prompter.busy("Cloning...");
        let result = self
            .platform
            .clone_asset(
                &identity.xuid,
                &identity.spartan_token,
                category,
                asset_id,
                version_id,
            )
            .await;
        spinner.finish_and_clear();

        match result {
            Ok(()) => {
                self.prompter.say(CLONED);
                Ok(Flow::Leave(Navigate::Base))
            }
            Err(err) => {
                tracing::warn!(%asset_id, %version_id, %err, "clone failed");
                self.prompter.say(CLONE_FAILED);
                Ok(Flow::Restart)
            }
        }
    }
}

fn validate_guid(input: &str) -> Result<(), String> {
    extract_guid(input)
        .map(|_| ())
        .map_err(|_| "invalid GUID".to_string())
}

/// Normalize the two manual-entry fields. The version is optional and only
/// checked when something was typed.
fn parse_asset_input(asset_id: &str, version_id: &str) -> Result<AssetReference, GuidError> {
    let asset_id = extract_guid(asset_id.trim())?;
    let version_id = version_id.trim();
    let version_id = if version_id.is_empty() {
        None
    } else {
        Some(extract_guid(version_id)?)
    };

    Ok(AssetReference {
        asset_id,
        version_id,
    })
}

fn derive_asset(stats: &MatchStats, kind: VariantKind) -> AssetReference {
    let variant = match kind {
        VariantKind::Map => &stats.match_info.map_variant,
        VariantKind::GameVariant => &stats.match_info.ugc_game_variant,
    };
    let version_id = variant.version_id.trim();

    AssetReference {
        asset_id: variant.asset_id.clone(),
        version_id: (!version_id.is_empty()).then(|| version_id.to_string()),
    }
}

fn variant_summary(match_id: &str, category: BookmarkCategory, asset: &AssetReference) -> String {
    [
        format!("Match Details (ID: {})", match_id),
        format!("│ {}", category.label()),
        format!("├── Asset ID: {}", asset.asset_id),
        format!(
            "└── Version ID: {}",
            asset.version_id.as_deref().unwrap_or_default()
        ),
    ]
    .join("\n")
}
