use crate::errors::{FeederError, FeederResult};
use crate::sources::traits::FeedSource;
use crate::sources::{
    anthropic_engineering::AnthropicEngineeringSource, anthropic_news::AnthropicNewsSource,
    surge_blog::SurgeBlogSource,
};

pub struct SourceRegistry {
    sources: Vec<Box<dyn FeedSource>>,
}

impl SourceRegistry {
    /// Registry with every built-in source
    pub fn new() -> FeederResult<Self> {
        let mut registry = Self::empty();

        registry.register(Box::new(AnthropicNewsSource::new()?))?;
        registry.register(Box::new(AnthropicEngineeringSource::new()?))?;
        registry.register(Box::new(SurgeBlogSource::new()?))?;

        Ok(registry)
    }

    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Identities must stay unique since each maps to one output file
    pub fn register(&mut self, source: Box<dyn FeedSource>) -> FeederResult<()> {
        if self.find(source.identity().as_str()).is_some() {
            return Err(FeederError::Config(format!(
                "feed {} registered twice",
                source.identity()
            )));
        }
        source.rules().validate()?;
        self.sources.push(source);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&dyn FeedSource> {
        self.sources
            .iter()
            .find(|s| s.identity().as_str() == name)
            .map(|s| s.as_ref())
    }

    pub fn get(&self, name: &str) -> FeederResult<&dyn FeedSource> {
        self.find(name)
            .ok_or_else(|| FeederError::UnknownFeed(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.identity().as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn FeedSource> {
        self.sources.iter().map(|s| s.as_ref())
    }
}
