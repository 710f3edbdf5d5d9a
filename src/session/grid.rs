//! Image grid presentation
//!
//! "Original" and "enhanced" card lists plus the active tab.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::session::staging::StagedFile;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum GridTab {
    Original,
    Enhanced,
}

impl GridTab {
    pub const ALL: [GridTab; 2] = [GridTab::Original, GridTab::Enhanced];

    pub fn name(&self) -> &'static str {
        match self {
            GridTab::Original => "original",
            GridTab::Enhanced => "enhanced",
        }
    }

    /// Identifier of the grid this tab controls
    pub fn grid_id(&self) -> &'static str {
        match self {
            GridTab::Original => "original-grid",
            GridTab::Enhanced => "enhanced-grid",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GridTab::Original => "Original Images",
            GridTab::Enhanced => "Enhanced Images",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            GridTab::Original => "No images uploaded yet",
            GridTab::Enhanced => "No enhanced images yet",
        }
    }
}

/// Where a card's thumbnail comes from
#[derive(Clone, PartialEq, Debug)]
pub enum CardSource {
    Local(PathBuf),
    Remote(String),
}

impl CardSource {
    pub fn src(&self) -> String {
        match self {
            CardSource::Local(path) => path.to_string_lossy().to_string(),
            CardSource::Remote(url) => url.clone(),
        }
    }
}

/// The single action control on a card
#[derive(Clone, PartialEq, Debug)]
pub enum CardAction {
    /// Unstage the file with this id
    Remove(Uuid),
    /// Save the server output `file_name` locally as `save_as`
    Download { file_name: String, save_as: String },
}

#[derive(Clone, PartialEq, Debug)]
pub struct ImageCard {
    pub key: String,
    pub label: String,
    pub detail: Option<String>,
    pub source: CardSource,
    pub action: CardAction,
}

/// Cards for the staged set, one per file
pub fn original_cards(files: &[StagedFile]) -> Vec<ImageCard> {
    files
        .iter()
        .map(|file| ImageCard {
            key: format!("uploaded-{}", file.id),
            label: file.name.clone(),
            detail: Some(file.size_string()),
            source: CardSource::Local(file.path.clone()),
            action: CardAction::Remove(file.id),
        })
        .collect()
}

/// Cards for an enhancement response; `url_for` yields the cache-busted
/// source of each output file.
pub fn enhanced_cards(names: &[String], url_for: impl Fn(&str) -> String) -> Vec<ImageCard> {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| ImageCard {
            key: format!("enhanced-{}-{}", index, name),
            label: format!("Enhanced {}", name),
            detail: None,
            source: CardSource::Remote(url_for(name)),
            action: CardAction::Download {
                file_name: name.clone(),
                save_as: format!("enhanced_{}", name),
            },
        })
        .collect()
}

#[derive(Debug)]
pub struct ImageGrid {
    original: Vec<ImageCard>,
    enhanced: Vec<ImageCard>,
    active: GridTab,
}

impl Default for ImageGrid {
    fn default() -> Self {
        Self {
            original: Vec::new(),
            enhanced: Vec::new(),
            active: GridTab::Original,
        }
    }
}

impl ImageGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear and rebuild one grid
    pub fn render(&mut self, tab: GridTab, cards: Vec<ImageCard>) {
        *self.grid_mut(tab) = cards;
    }

    pub fn remove_card(&mut self, tab: GridTab, key: &str) -> bool {
        let grid = self.grid_mut(tab);
        let before = grid.len();
        grid.retain(|c| c.key != key);
        before != grid.len()
    }

    pub fn clear(&mut self) {
        self.original.clear();
        self.enhanced.clear();
    }

    pub fn cards(&self, tab: GridTab) -> &[ImageCard] {
        match tab {
            GridTab::Original => &self.original,
            GridTab::Enhanced => &self.enhanced,
        }
    }

    pub fn is_empty(&self, tab: GridTab) -> bool {
        self.cards(tab).is_empty()
    }

    /// Empty-state placeholder visibility
    pub fn shows_placeholder(&self, tab: GridTab) -> bool {
        self.is_empty(tab)
    }

    /// Make the grid whose identifier contains `name` the only visible one.
    /// Unknown names leave the current tab in place.
    pub fn switch_tab(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match GridTab::ALL.iter().find(|tab| tab.grid_id().contains(name)) {
            Some(tab) => {
                self.active = *tab;
                true
            }
            None => false,
        }
    }

    pub fn active_tab(&self) -> GridTab {
        self.active
    }

    pub fn is_visible(&self, tab: GridTab) -> bool {
        self.active == tab
    }

    fn grid_mut(&mut self, tab: GridTab) -> &mut Vec<ImageCard> {
        match tab {
            GridTab::Original => &mut self.original,
            GridTab::Enhanced => &mut self.enhanced,
        }
    }
}
