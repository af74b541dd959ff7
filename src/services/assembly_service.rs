use rss::extension::atom::{AtomExtension, Link};
use rss::{
    Category, CategoryBuilder, Channel, ChannelBuilder, GuidBuilder, Image, ImageBuilder, Item,
    ItemBuilder,
};

use crate::domain::{Article, FeedDefinition};
use crate::errors::{FeederError, FeederResult};

pub const GENERATOR: &str = "scrapefeed";

/// Renders merged articles as an RSS 2.0 document
pub struct FeedAssembler<'a> {
    definition: &'a FeedDefinition,
}

impl<'a> FeedAssembler<'a> {
    pub fn new(definition: &'a FeedDefinition) -> Self {
        Self { definition }
    }

    pub fn channel(&self, articles: &[Article]) -> Channel {
        // Newest entry rather than wall clock, so unchanged input renders identically
        let last_build_date = articles
            .iter()
            .map(|a| a.published_at)
            .max()
            .map(|d| d.to_rfc2822());

        ChannelBuilder::default()
            .title(self.definition.title.clone())
            .link(self.definition.url.clone())
            .description(self.definition.description.clone())
            .language(Some(self.definition.language.clone()))
            .generator(Some(GENERATOR.to_string()))
            .last_build_date(last_build_date)
            .managing_editor(self.definition.managing_editor.clone())
            .image(self.image())
            .atom_ext(self.self_link())
            .items(articles.iter().map(item).collect::<Vec<Item>>())
            .build()
    }

    fn image(&self) -> Option<Image> {
        self.definition.image_url.as_ref().map(|url| {
            ImageBuilder::default()
                .url(url.clone())
                .title(self.definition.title.clone())
                .link(self.definition.url.clone())
                .build()
        })
    }

    fn self_link(&self) -> Option<AtomExtension> {
        self.definition.self_url.as_ref().map(|href| {
            let mut link = Link::default();
            link.set_href(href.clone());
            link.set_rel("self");
            link.set_mime_type(Some("application/rss+xml".to_string()));

            let mut atom = AtomExtension::default();
            atom.set_links(vec![link]);
            atom
        })
    }

    pub fn render(&self, articles: &[Article]) -> FeederResult<String> {
        let bytes = self.channel(articles).pretty_write_to(Vec::new(), b' ', 2)?;

        String::from_utf8(bytes).map_err(|e| FeederError::AssemblyError(e.to_string()))
    }
}

fn item(article: &Article) -> Item {
    let guid = GuidBuilder::default()
        .value(article.link.clone())
        .permalink(true)
        .build();

    let categories: Vec<Category> = article
        .categories
        .iter()
        .map(|c| CategoryBuilder::default().name(c.clone()).build())
        .collect();

    ItemBuilder::default()
        .title(Some(article.title.clone()))
        .link(Some(article.link.clone()))
        .guid(Some(guid))
        .pub_date(Some(article.published_at.to_rfc2822()))
        .description(Some(article.description().to_string()))
        .categories(categories)
        .build()
}
