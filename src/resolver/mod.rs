use anyhow::{anyhow, Result};
use std::future::Future;
use std::pin::Pin;

use crate::settings::Settings;

mod corpus;
mod libre;
mod mymemory;
mod retry;

pub use corpus::CorpusResolver;
pub use libre::Libre;
pub use mymemory::MyMemory;

/// Which way a single request translates. The source side is the
/// CJK-script language of the deployment (`provider.source_lang` /
/// `corpus.source_path`), the target side the Latin-script one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    SourceToTarget,
    TargetToSource,
}

impl Direction {
    pub fn from_script(script: crate::normalize::Script) -> Self {
        match script {
            crate::normalize::Script::Cjk => Direction::SourceToTarget,
            crate::normalize::Script::Latin => Direction::TargetToSource,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverKind {
    Corpus,
    MyMemory,
    Libre,
}

impl ResolverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolverKind::Corpus => "corpus",
            ResolverKind::MyMemory => "mymemory",
            ResolverKind::Libre => "libre",
        }
    }
}

pub type ResolveFuture = Pin<Box<dyn Future<Output = Result<String>> + Send>>;

/// A translation lookup. A miss (phrase unknown to the corpus, provider
/// refusal) is an `Err`; the caller folds it into the structured error
/// field of its response rather than propagating it further.
pub trait Resolver: Send + Sync {
    fn resolve(&self, phrase: &str, direction: Direction) -> ResolveFuture;
}

#[derive(Debug, Clone)]
pub enum ResolverImpl {
    Corpus(CorpusResolver),
    MyMemory(MyMemory),
    Libre(Libre),
}

impl Resolver for ResolverImpl {
    fn resolve(&self, phrase: &str, direction: Direction) -> ResolveFuture {
        match self {
            ResolverImpl::Corpus(resolver) => resolver.resolve(phrase, direction),
            ResolverImpl::MyMemory(resolver) => resolver.resolve(phrase, direction),
            ResolverImpl::Libre(resolver) => resolver.resolve(phrase, direction),
        }
    }
}

pub fn build_resolver(settings: &Settings) -> Result<ResolverImpl> {
    match settings.resolver_strategy.as_str() {
        "corpus" => {
            let source = settings.corpus_source_path.as_deref().ok_or_else(|| {
                anyhow!("resolver strategy is 'corpus' but [corpus].source_path is not set")
            })?;
            let target = settings.corpus_target_path.as_deref().ok_or_else(|| {
                anyhow!("resolver strategy is 'corpus' but [corpus].target_path is not set")
            })?;
            Ok(ResolverImpl::Corpus(CorpusResolver::load(source, target)?))
        }
        "provider" => build_provider_resolver(settings),
        other => Err(anyhow!(
            "unknown resolver strategy '{}' (expected corpus or provider)",
            other
        )),
    }
}

fn build_provider_resolver(settings: &Settings) -> Result<ResolverImpl> {
    let Some(kind) = kind_from_name(&settings.provider_name) else {
        return Err(anyhow!(
            "unknown translation provider '{}' (expected mymemory or libre)",
            settings.provider_name
        ));
    };
    match kind {
        ResolverKind::MyMemory => Ok(ResolverImpl::MyMemory(MyMemory::new(
            settings.source_lang.clone(),
            settings.target_lang.clone(),
            settings.provider_api_key.clone(),
            settings.provider_base_url.clone(),
        ))),
        ResolverKind::Libre => Ok(ResolverImpl::Libre(Libre::new(
            settings.source_lang.clone(),
            settings.target_lang.clone(),
            settings.provider_api_key.clone(),
            settings.provider_base_url.clone(),
        ))),
        ResolverKind::Corpus => Err(anyhow!(
            "'corpus' is a resolver strategy, not a provider name"
        )),
    }
}

fn kind_from_name(name: &str) -> Option<ResolverKind> {
    match name {
        "mymemory" => Some(ResolverKind::MyMemory),
        "libre" | "libretranslate" => Some(ResolverKind::Libre),
        _ => None,
    }
}

/// Language pair for a request, as `(from, to)` codes.
pub(crate) fn langpair(
    source_lang: &str,
    target_lang: &str,
    direction: Direction,
) -> (String, String) {
    match direction {
        Direction::SourceToTarget => (source_lang.to_string(), target_lang.to_string()),
        Direction::TargetToSource => (target_lang.to_string(), source_lang.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_strategy_requires_both_paths() {
        let mut settings = Settings::default();
        settings.resolver_strategy = "corpus".to_string();
        settings.corpus_source_path = Some("only-one-side.txt".to_string());
        let err = build_resolver(&settings).expect_err("missing target path");
        assert!(err.to_string().contains("target_path"));
    }

    #[test]
    fn provider_names_are_recognized() {
        assert_eq!(kind_from_name("mymemory"), Some(ResolverKind::MyMemory));
        assert_eq!(kind_from_name("libretranslate"), Some(ResolverKind::Libre));
        assert_eq!(kind_from_name("google"), None);
    }

    #[test]
    fn direction_follows_script() {
        use crate::normalize::Script;
        assert_eq!(
            Direction::from_script(Script::Cjk),
            Direction::SourceToTarget
        );
        assert_eq!(
            Direction::from_script(Script::Latin),
            Direction::TargetToSource
        );
    }

    #[test]
    fn langpair_flips_with_direction() {
        let (from, to) = langpair("zh", "en", Direction::TargetToSource);
        assert_eq!(from, "en");
        assert_eq!(to, "zh");
    }
}
