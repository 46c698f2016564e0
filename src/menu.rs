use anyhow::Result;
use colored::Colorize;

use crate::bookmark::BookmarkFlow;
use crate::client::GamePlatform;
use crate::identity::{mask_token, IdentityProvider};
use crate::prompts::{PromptError, Prompter};

const BOOKMARK: &str = "Bookmark an asset";
const SHOW_IDENTITY: &str = "Show active identity";
const EXIT: &str = "Exit";

/// Where a menu hands control once it is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigate {
    Base,
    Bookmark,
    Identity,
    Exit,
}

/// Top-level loop: every menu returns the next destination instead of
/// calling into another menu.
pub async fn dispatch(
    start: Navigate,
    prompter: &mut dyn Prompter,
    platform: &dyn GamePlatform,
    identities: &dyn IdentityProvider,
) -> Result<()> {
    let mut target = start;
    loop {
        tracing::debug!(?target, "navigating");
        target = match target {
            Navigate::Base => base_menu(prompter)?,
            Navigate::Bookmark => {
                let outcome = BookmarkFlow::new(&mut *prompter, platform, identities)
                    .run()
                    .await;
                match outcome {
                    Ok(next) => next,
                    // A broken terminal would spin this loop forever.
                    Err(err) if err.downcast_ref::<PromptError>().is_some() => return Err(err),
                    Err(err) => {
                        tracing::warn!(error = %err, "bookmark flow aborted");
                        prompter.say(&format!("❌ {:#}", err));
                        Navigate::Base
                    }
                }
            }
            Navigate::Identity => {
                show_identity(prompter, identities);
                Navigate::Base
            }
            Navigate::Exit => return Ok(()),
        };
    }
}

fn base_menu(prompter: &mut dyn Prompter) -> Result<Navigate> {
    let options = [BOOKMARK, SHOW_IDENTITY, EXIT];
    match prompter.select("What would you like to do?", &options) {
        Ok(index) => Ok(match options[index] {
            BOOKMARK => Navigate::Bookmark,
            SHOW_IDENTITY => Navigate::Identity,
            _ => Navigate::Exit,
        }),
        Err(PromptError::Cancelled) => Ok(Navigate::Exit),
        Err(err) => Err(err.into()),
    }
}

fn show_identity(prompter: &mut dyn Prompter, identities: &dyn IdentityProvider) {
    match identities.active_identity() {
        Ok(identity) => {
            prompter.say(&format!("{} {}", "✓".green(), "Signed in".bold()));
            prompter.say(&format!("  XUID: {}", identity.xuid));
            prompter.say(&format!(
                "  Spartan token: {}",
                mask_token(&identity.spartan_token)
            ));
        }
        Err(err) => {
            prompter.say(&format!("{} {}", "✗".red(), err));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use indicatif::ProgressBar;

    use super::*;
    use crate::client::{ApiError, BookmarkCategory, FilmInfo, MatchStats};
    use crate::identity::Identity;
    use crate::prompts::InputValidator;

    struct MenuScript {
        selections: VecDeque<Result<usize, PromptError>>,
        said: Vec<String>,
    }

    impl MenuScript {
        fn new(selections: Vec<Result<usize, PromptError>>) -> Self {
            Self {
                selections: selections.into(),
                said: Vec::new(),
            }
        }
    }

    impl Prompter for MenuScript {
        fn select(&mut self, _title: &str, _options: &[&str]) -> Result<usize, PromptError> {
            self.selections
                .pop_front()
                .unwrap_or_else(|| Err(PromptError::Terminal("script exhausted".into())))
        }

        fn text(
            &mut self,
            _title: &str,
            _help: &str,
            _validator: Option<InputValidator>,
        ) -> Result<String, PromptError> {
            Err(PromptError::Terminal("unexpected text prompt".into()))
        }

        fn confirm(&mut self, _title: &str, _default: bool) -> Result<bool, PromptError> {
            Err(PromptError::Terminal("unexpected confirm".into()))
        }

        fn busy(&mut self, _title: &str) -> ProgressBar {
            ProgressBar::hidden()
        }

        fn say(&mut self, message: &str) {
            self.said.push(message.to_string());
        }
    }

    /// Platform that must never be reached from the menus alone.
    struct Unreachable;

    #[async_trait]
    impl GamePlatform for Unreachable {
        async fn match_stats(&self, _: &str, _: &str) -> Result<MatchStats, ApiError> {
            unreachable!()
        }

        async fn match_film(&self, _: &str, _: &str) -> Result<FilmInfo, ApiError> {
            unreachable!()
        }

        async fn ping_published_asset(
            &self,
            _: &str,
            _: BookmarkCategory,
            _: &str,
        ) -> Result<(), ApiError> {
            unreachable!()
        }

        async fn clone_asset(
            &self,
            _: &str,
            _: &str,
            _: BookmarkCategory,
            _: &str,
            _: &str,
        ) -> Result<(), ApiError> {
            unreachable!()
        }

        async fn bookmark(
            &self,
            _: &str,
            _: &str,
            _: BookmarkCategory,
            _: &str,
            _: Option<&str>,
        ) -> Result<(), ApiError> {
            unreachable!()
        }
    }

    struct NoIdentity;

    impl IdentityProvider for NoIdentity {
        fn active_identity(&self) -> Result<Identity> {
            anyhow::bail!("No active identity")
        }
    }

    #[tokio::test]
    async fn test_exit_from_base_menu() {
        let mut prompter = MenuScript::new(vec![Ok(2)]);
        dispatch(Navigate::Base, &mut prompter, &Unreachable, &NoIdentity)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_base_menu_exits() {
        let mut prompter = MenuScript::new(vec![Err(PromptError::Cancelled)]);
        dispatch(Navigate::Base, &mut prompter, &Unreachable, &NoIdentity)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_bookmark_back_returns_to_base() {
        // bookmark -> "Go back" -> exit
        let mut prompter = MenuScript::new(vec![Ok(0), Ok(3), Ok(2)]);
        dispatch(Navigate::Base, &mut prompter, &Unreachable, &NoIdentity)
            .await
            .unwrap();
        assert!(prompter.said.is_empty());
    }

    #[tokio::test]
    async fn test_missing_identity_reported_then_base() {
        // straight into bookmarking, pick a map, identity missing, then exit
        let mut prompter = MenuScript::new(vec![Ok(0), Ok(2)]);
        dispatch(Navigate::Bookmark, &mut prompter, &Unreachable, &NoIdentity)
            .await
            .unwrap();
        assert_eq!(prompter.said, vec!["❌ No active identity".to_string()]);
    }

    #[tokio::test]
    async fn test_terminal_error_propagates() {
        let mut prompter = MenuScript::new(vec![]);
        let err = dispatch(Navigate::Base, &mut prompter, &Unreachable, &NoIdentity)
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<PromptError>().is_some());
    }

    #[tokio::test]
    async fn test_show_identity_without_sign_in() {
        let mut prompter = MenuScript::new(vec![Ok(1), Ok(2)]);
        dispatch(Navigate::Base, &mut prompter, &Unreachable, &NoIdentity)
            .await
            .unwrap();
        assert_eq!(prompter.said.len(), 1);
        assert!(prompter.said[0].contains("No active identity"));
    }
}
