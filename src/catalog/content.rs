//! Content Pools
//!
//! Static content tables the engines sample from: word/image pairs, blank
//! sentences, puzzle scenes with hotspot rectangles, spelling words and
//! sentence-builder scenarios. Pure data, no behavior beyond lookup with a
//! per-level fallback so a missing pool never crashes a session.

use std::collections::BTreeMap;
use serde::Serialize;

use super::level::{LevelId, SceneId};

// =============================================================================
// ENTRY TYPES
// =============================================================================

/// One matchable pair in a pair pool.
///
/// The pools carry two shapes: picture/word pairs (animals) and text/text
/// pairs (verb forms, antonyms). Engines derive card faces from whichever
/// shape they are handed.
#[derive(Clone, Debug, Serialize)]
pub enum PairEntry {
    /// Picture paired with its word (e.g. a cat photo and "Cat").
    WordImage {
        /// Stable pair id within the pool.
        id: u32,
        /// The word half.
        word: &'static str,
        /// Asset key for the picture half.
        image: &'static str,
    },
    /// Two related words (e.g. "Go"/"Went", "Hot"/"Cold").
    TextPair {
        /// Stable pair id within the pool.
        id: u32,
        /// First half.
        first: &'static str,
        /// Second half.
        second: &'static str,
    },
}

impl PairEntry {
    /// Pair id, regardless of shape.
    pub fn id(&self) -> u32 {
        match self {
            PairEntry::WordImage { id, .. } => *id,
            PairEntry::TextPair { id, .. } => *id,
        }
    }
}

/// An action item for line matching: a picture and the verb naming it.
#[derive(Clone, Debug, Serialize)]
pub struct ActionEntry {
    /// Stable item id within the pool.
    pub id: u32,
    /// The action word ("Running", "Sleeping", ...).
    pub word: &'static str,
    /// Asset key for the picture.
    pub image: &'static str,
}

/// A fill-in-the-blank question.
#[derive(Clone, Debug, Serialize)]
pub struct BlankEntry {
    /// Stable question id within the pool.
    pub id: u32,
    /// Sentence with a `___` placeholder.
    pub sentence: &'static str,
    /// The correct option.
    pub answer: &'static str,
    /// Draggable options, answer included.
    pub options: [&'static str; 3],
}

/// A hotspot rectangle in integer percent of the scene image.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct HotspotRect {
    /// Top edge, percent of image height.
    pub top: u8,
    /// Left edge, percent of image width.
    pub left: u8,
    /// Width, percent of image width.
    pub width: u8,
    /// Height, percent of image height.
    pub height: u8,
}

impl HotspotRect {
    /// Whether a drop point (percent coordinates) lands inside this zone.
    #[inline]
    pub fn contains(&self, x_pct: u8, y_pct: u8) -> bool {
        x_pct >= self.left
            && x_pct <= self.left.saturating_add(self.width)
            && y_pct >= self.top
            && y_pct <= self.top.saturating_add(self.height)
    }

    /// Center point of the zone, percent coordinates.
    pub fn center(&self) -> (u8, u8) {
        (
            self.left.saturating_add(self.width / 2),
            self.top.saturating_add(self.height / 2),
        )
    }
}

/// One draggable label and its target zone in a puzzle scene.
#[derive(Clone, Debug, Serialize)]
pub struct HotspotItem {
    /// Stable item id within the scene.
    pub id: u32,
    /// Label text on the draggable chip.
    pub label: &'static str,
    /// Target zone on the scene image.
    pub rect: HotspotRect,
}

/// A puzzle scene: one picture with a set of labeled hotspots.
#[derive(Clone, Debug, Serialize)]
pub struct PuzzleScene {
    /// Scene identity (used by dynamic stage plans).
    pub id: SceneId,
    /// Asset key for the scene picture.
    pub image: &'static str,
    /// Instruction line shown above the scene.
    pub instruction: &'static str,
    /// Hotspot items to place.
    pub items: Vec<HotspotItem>,
}

/// A spelling round: a word to spell and the picture prompting it.
#[derive(Clone, Debug, Serialize)]
pub struct SpellingEntry {
    /// Stable entry id within the pool.
    pub id: u32,
    /// The word to spell, uppercase.
    pub word: &'static str,
    /// Asset key for the prompt picture.
    pub image: &'static str,
    /// Optional carrier sentence (color variant).
    pub sentence: Option<&'static str>,
}

/// A sentence-builder scenario: a picture and the sentence describing it.
#[derive(Clone, Debug, Serialize)]
pub struct SentenceEntry {
    /// Stable entry id within the pool.
    pub id: u32,
    /// Target sentence, space-separated tokens.
    pub sentence: &'static str,
    /// Asset key for the scenario picture.
    pub image: &'static str,
}

// =============================================================================
// CATALOG
// =============================================================================

/// All bundled content pools, keyed by level, with per-kind fallbacks.
///
/// Lookup never fails: a level without a pool of some kind borrows the
/// default level's pool for that kind, and an entirely absent pool yields an
/// empty slice (engines then render a placeholder rather than crash).
#[derive(Clone, Debug, Default)]
pub struct ContentCatalog {
    pairs: BTreeMap<LevelId, Vec<PairEntry>>,
    actions: BTreeMap<LevelId, Vec<ActionEntry>>,
    blanks: BTreeMap<LevelId, Vec<BlankEntry>>,
    scenes: BTreeMap<LevelId, Vec<PuzzleScene>>,
    spelling: BTreeMap<LevelId, Vec<SpellingEntry>>,
    color_spelling: BTreeMap<LevelId, Vec<SpellingEntry>>,
    sentences: BTreeMap<LevelId, Vec<SentenceEntry>>,
}

impl ContentCatalog {
    /// Build the catalog shipped with the game.
    pub fn bundled() -> Self {
        let mut catalog = Self::default();
        catalog.pairs.insert(LevelId::SmallStars, animal_pairs());
        catalog.pairs.insert(LevelId::HighFlyers, verb_pairs());
        catalog.pairs.insert(LevelId::Trailblazers, antonym_pairs());
        catalog.pairs.insert(LevelId::Frontrunner, verb_pairs());
        catalog.actions.insert(LevelId::SmallStars, action_items());
        catalog.blanks.insert(LevelId::Trailblazers, blank_questions());
        catalog.scenes.insert(LevelId::HighFlyers, puzzle_scenes());
        catalog.spelling.insert(LevelId::SmallStars, animal_spelling());
        catalog
            .color_spelling
            .insert(LevelId::SmallStars, color_spelling());
        catalog
            .sentences
            .insert(LevelId::HighFlyers, sentence_scenarios());
        catalog
    }

    fn lookup<'a, T>(
        map: &'a BTreeMap<LevelId, Vec<T>>,
        level: LevelId,
        fallback: LevelId,
    ) -> &'a [T] {
        map.get(&level)
            .or_else(|| map.get(&fallback))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Pair pool for a level (falls back to SmallStars).
    pub fn pairs(&self, level: LevelId) -> &[PairEntry] {
        Self::lookup(&self.pairs, level, LevelId::SmallStars)
    }

    /// Text-pair subset of a level's pair pool (falls back to HighFlyers).
    ///
    /// Card-memory decks need two text faces; picture pools are skipped.
    pub fn text_pairs(&self, level: LevelId) -> Vec<PairEntry> {
        let own: Vec<PairEntry> = self
            .pairs(level)
            .iter()
            .filter(|e| matches!(e, PairEntry::TextPair { .. }))
            .cloned()
            .collect();
        if !own.is_empty() {
            return own;
        }
        self.pairs(LevelId::HighFlyers)
            .iter()
            .filter(|e| matches!(e, PairEntry::TextPair { .. }))
            .cloned()
            .collect()
    }

    /// Picture-pair subset of a level's pair pool (falls back to SmallStars).
    ///
    /// Find-the-pair grids flip picture cards and name the target by word.
    pub fn picture_pairs(&self, level: LevelId) -> Vec<PairEntry> {
        let own: Vec<PairEntry> = self
            .pairs(level)
            .iter()
            .filter(|e| matches!(e, PairEntry::WordImage { .. }))
            .cloned()
            .collect();
        if !own.is_empty() {
            return own;
        }
        self.pairs(LevelId::SmallStars)
            .iter()
            .filter(|e| matches!(e, PairEntry::WordImage { .. }))
            .cloned()
            .collect()
    }

    /// Line-matching action pool for a level (falls back to SmallStars).
    pub fn actions(&self, level: LevelId) -> &[ActionEntry] {
        Self::lookup(&self.actions, level, LevelId::SmallStars)
    }

    /// Fill-in-the-blank pool for a level (falls back to Trailblazers).
    pub fn blanks(&self, level: LevelId) -> &[BlankEntry] {
        Self::lookup(&self.blanks, level, LevelId::Trailblazers)
    }

    /// Puzzle scene pool for a level (falls back to HighFlyers).
    pub fn scenes(&self, level: LevelId) -> &[PuzzleScene] {
        Self::lookup(&self.scenes, level, LevelId::HighFlyers)
    }

    /// Spelling pool for a level (falls back to SmallStars).
    pub fn spelling(&self, level: LevelId) -> &[SpellingEntry] {
        Self::lookup(&self.spelling, level, LevelId::SmallStars)
    }

    /// Color-spelling pool for a level (falls back to SmallStars).
    pub fn color_spelling(&self, level: LevelId) -> &[SpellingEntry] {
        Self::lookup(&self.color_spelling, level, LevelId::SmallStars)
    }

    /// Sentence-builder pool for a level (falls back to HighFlyers).
    pub fn sentences(&self, level: LevelId) -> &[SentenceEntry] {
        Self::lookup(&self.sentences, level, LevelId::HighFlyers)
    }
}

// =============================================================================
// BUNDLED TABLES
// =============================================================================

fn animal_pairs() -> Vec<PairEntry> {
    use PairEntry::WordImage;
    vec![
        WordImage { id: 1, word: "Cat", image: "img/animals/cat.jpg" },
        WordImage { id: 2, word: "Dog", image: "img/animals/dog.jpg" },
        WordImage { id: 3, word: "Bird", image: "img/animals/bird.jpg" },
        WordImage { id: 4, word: "Fish", image: "img/animals/fish.jpg" },
        WordImage { id: 5, word: "Rabbit", image: "img/animals/rabbit.jpg" },
        WordImage { id: 6, word: "Duck", image: "img/animals/duck.png" },
        WordImage { id: 7, word: "Cow", image: "img/animals/cow.png" },
        WordImage { id: 8, word: "Horse", image: "img/animals/horse.png" },
    ]
}

fn verb_pairs() -> Vec<PairEntry> {
    use PairEntry::TextPair;
    // Irregular verbs (V1 - V2)
    vec![
        TextPair { id: 1, first: "Go", second: "Went" },
        TextPair { id: 2, first: "Eat", second: "Ate" },
        TextPair { id: 3, first: "See", second: "Saw" },
        TextPair { id: 4, first: "Take", second: "Took" },
        TextPair { id: 5, first: "Make", second: "Made" },
        TextPair { id: 6, first: "Know", second: "Knew" },
        TextPair { id: 7, first: "Write", second: "Wrote" },
        TextPair { id: 8, first: "Speak", second: "Spoke" },
        TextPair { id: 9, first: "Run", second: "Ran" },
    ]
}

fn antonym_pairs() -> Vec<PairEntry> {
    use PairEntry::TextPair;
    vec![
        TextPair { id: 1, first: "Hot", second: "Cold" },
        TextPair { id: 2, first: "Big", second: "Small" },
        TextPair { id: 3, first: "Up", second: "Down" },
        TextPair { id: 4, first: "Happy", second: "Sad" },
        TextPair { id: 5, first: "Fast", second: "Slow" },
        TextPair { id: 6, first: "Day", second: "Night" },
        TextPair { id: 7, first: "Good", second: "Bad" },
        TextPair { id: 8, first: "Rich", second: "Poor" },
        TextPair { id: 9, first: "Long", second: "Short" },
    ]
}

fn action_items() -> Vec<ActionEntry> {
    vec![
        ActionEntry { id: 1, word: "Eating", image: "img/actions/eating.jpg" },
        ActionEntry { id: 2, word: "Sleeping", image: "img/actions/sleeping.jpg" },
        ActionEntry { id: 3, word: "Running", image: "img/actions/running.jpg" },
        ActionEntry { id: 4, word: "Kicking", image: "img/actions/kicking.jpg" },
        ActionEntry { id: 5, word: "Swimming", image: "img/actions/swimming.jpg" },
        ActionEntry { id: 6, word: "Crying", image: "img/actions/crying.jpg" },
        ActionEntry { id: 7, word: "Drinking", image: "img/actions/drinking.jpg" },
        ActionEntry { id: 8, word: "Pulling", image: "img/actions/pulling.jpg" },
        ActionEntry { id: 9, word: "Pushing", image: "img/actions/pushing.jpg" },
    ]
}

fn blank_questions() -> Vec<BlankEntry> {
    vec![
        BlankEntry {
            id: 1,
            sentence: "The sun is ___ today.",
            answer: "Hot",
            options: ["Hot", "Cold", "Blue"],
        },
        BlankEntry {
            id: 2,
            sentence: "Elephants are very ___.",
            answer: "Big",
            options: ["Big", "Small", "Tiny"],
        },
        BlankEntry {
            id: 3,
            sentence: "Birds fly ___ in the sky.",
            answer: "Up",
            options: ["Up", "Down", "Under"],
        },
        BlankEntry {
            id: 4,
            sentence: "I feel ___ when I smile.",
            answer: "Happy",
            options: ["Happy", "Sad", "Angry"],
        },
        BlankEntry {
            id: 5,
            sentence: "Turtles are very ___.",
            answer: "Slow",
            options: ["Slow", "Fast", "Quick"],
        },
    ]
}

fn puzzle_scenes() -> Vec<PuzzleScene> {
    vec![
        PuzzleScene {
            id: SceneId::Bedroom,
            image: "img/scenes/bedroom.png",
            instruction: "Match the words to the clothes!",
            items: vec![
                HotspotItem { id: 1, label: "Dress", rect: HotspotRect { top: 52, left: 10, width: 25, height: 25 } },
                HotspotItem { id: 2, label: "T-Shirt", rect: HotspotRect { top: 35, left: 55, width: 18, height: 18 } },
                HotspotItem { id: 3, label: "Jeans", rect: HotspotRect { top: 68, left: 18, width: 22, height: 25 } },
                HotspotItem { id: 4, label: "Hat", rect: HotspotRect { top: 35, left: 80, width: 15, height: 18 } },
                HotspotItem { id: 5, label: "Shoes", rect: HotspotRect { top: 58, left: 62, width: 12, height: 12 } },
                HotspotItem { id: 6, label: "Boots", rect: HotspotRect { top: 18, left: 25, width: 10, height: 15 } },
                HotspotItem { id: 7, label: "Cap", rect: HotspotRect { top: 15, left: 82, width: 10, height: 10 } },
                HotspotItem { id: 8, label: "Skirt", rect: HotspotRect { top: 35, left: 35, width: 15, height: 15 } },
            ],
        },
        PuzzleScene {
            id: SceneId::Restaurant,
            image: "img/scenes/restaurant.png",
            instruction: "Find the food items!",
            items: vec![
                HotspotItem { id: 1, label: "Pizza", rect: HotspotRect { top: 15, left: 30, width: 25, height: 10 } },
                HotspotItem { id: 2, label: "Ice Cream", rect: HotspotRect { top: 45, left: 10, width: 8, height: 15 } },
                HotspotItem { id: 3, label: "Burger", rect: HotspotRect { top: 80, left: 5, width: 12, height: 12 } },
                HotspotItem { id: 4, label: "Salad", rect: HotspotRect { top: 75, left: 18, width: 12, height: 15 } },
                HotspotItem { id: 5, label: "Tea", rect: HotspotRect { top: 60, left: 53, width: 8, height: 12 } },
                HotspotItem { id: 6, label: "Eggs", rect: HotspotRect { top: 40, left: 60, width: 12, height: 12 } },
                HotspotItem { id: 7, label: "Cookies", rect: HotspotRect { top: 50, left: 60, width: 12, height: 10 } },
                HotspotItem { id: 8, label: "Sandwich", rect: HotspotRect { top: 55, left: 35, width: 12, height: 12 } },
            ],
        },
        PuzzleScene {
            id: SceneId::Playroom,
            image: "img/scenes/playroom.png",
            instruction: "Find the toys!",
            items: vec![
                HotspotItem { id: 1, label: "Teddy Bear", rect: HotspotRect { top: 38, left: 32, width: 10, height: 15 } },
                HotspotItem { id: 2, label: "Duck", rect: HotspotRect { top: 32, left: 68, width: 8, height: 10 } },
                HotspotItem { id: 3, label: "Ball", rect: HotspotRect { top: 48, left: 73, width: 8, height: 10 } },
                HotspotItem { id: 4, label: "Blocks", rect: HotspotRect { top: 28, left: 46, width: 12, height: 15 } },
                HotspotItem { id: 5, label: "Clock", rect: HotspotRect { top: 54, left: 40, width: 10, height: 12 } },
                HotspotItem { id: 6, label: "Train", rect: HotspotRect { top: 55, left: 10, width: 25, height: 15 } },
                HotspotItem { id: 7, label: "Book", rect: HotspotRect { top: 48, left: 50, width: 10, height: 12 } },
                HotspotItem { id: 8, label: "Headphones", rect: HotspotRect { top: 70, left: 48, width: 12, height: 15 } },
            ],
        },
    ]
}

fn animal_spelling() -> Vec<SpellingEntry> {
    vec![
        SpellingEntry { id: 1, word: "CAT", image: "img/animals/cat.jpg", sentence: None },
        SpellingEntry { id: 2, word: "DOG", image: "img/animals/dog.jpg", sentence: None },
        SpellingEntry { id: 3, word: "COW", image: "img/animals/cow.png", sentence: None },
        SpellingEntry { id: 4, word: "DUCK", image: "img/animals/duck.png", sentence: None },
        SpellingEntry { id: 5, word: "FISH", image: "img/animals/fish.jpg", sentence: None },
        SpellingEntry { id: 6, word: "BIRD", image: "img/animals/bird.jpg", sentence: None },
    ]
}

fn color_spelling() -> Vec<SpellingEntry> {
    vec![
        SpellingEntry { id: 1, word: "BLUE", image: "img/colors/jeans.jpg", sentence: Some("The long jeans are") },
        SpellingEntry { id: 2, word: "PINK", image: "img/colors/hair.jpg", sentence: Some("The girl has ___ hair") },
        SpellingEntry { id: 3, word: "BROWN", image: "img/colors/hat.jpg", sentence: Some("The warm hat is") },
        SpellingEntry { id: 4, word: "GREEN", image: "img/colors/skirt.jpg", sentence: Some("The small skirt is") },
        SpellingEntry { id: 5, word: "BLUE", image: "img/colors/bed.jpg", sentence: Some("The soft bed is") },
        SpellingEntry { id: 6, word: "PINK", image: "img/colors/dress.png", sentence: Some("The dress is") },
        SpellingEntry { id: 7, word: "RED", image: "img/colors/cap.jpg", sentence: Some("The cap is") },
        SpellingEntry { id: 8, word: "YELLOW", image: "img/colors/boots.png", sentence: Some("The boots are") },
        SpellingEntry { id: 9, word: "BLACK", image: "img/colors/shoes.jpg", sentence: Some("The shoes are") },
        SpellingEntry { id: 10, word: "GREEN", image: "img/colors/tshirt.jpg", sentence: Some("The T-shirt is") },
    ]
}

fn sentence_scenarios() -> Vec<SentenceEntry> {
    vec![
        SentenceEntry {
            id: 1,
            sentence: "She has a beautiful pink dress",
            image: "img/scenarios/pink_dress.jpg",
        },
        SentenceEntry {
            id: 2,
            sentence: "The happy girl saw a purple skirt",
            image: "img/scenarios/girl_skirt.png",
        },
        SentenceEntry {
            id: 3,
            sentence: "He quickly wear his grey shoes",
            image: "img/scenarios/grey_shoes.png",
        },
        SentenceEntry {
            id: 4,
            sentence: "The brave boy wore a brown hat",
            image: "img/scenarios/brown_hat.png",
        },
    ]
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_pool_sizes() {
        let catalog = ContentCatalog::bundled();
        assert_eq!(catalog.pairs(LevelId::SmallStars).len(), 8);
        assert_eq!(catalog.pairs(LevelId::Trailblazers).len(), 9);
        assert_eq!(catalog.actions(LevelId::SmallStars).len(), 9);
        assert_eq!(catalog.blanks(LevelId::Trailblazers).len(), 5);
        assert_eq!(catalog.scenes(LevelId::HighFlyers).len(), 3);
        assert_eq!(catalog.spelling(LevelId::SmallStars).len(), 6);
        assert_eq!(catalog.color_spelling(LevelId::SmallStars).len(), 10);
        assert_eq!(catalog.sentences(LevelId::HighFlyers).len(), 4);
    }

    #[test]
    fn test_missing_pool_falls_back() {
        let catalog = ContentCatalog::bundled();

        // Frontrunner has no blanks pool; it borrows the Trailblazers one.
        let fallback = catalog.blanks(LevelId::Frontrunner);
        assert_eq!(fallback.len(), 5);

        // SmallStars has no scene pool; it borrows the HighFlyers one.
        assert_eq!(catalog.scenes(LevelId::SmallStars).len(), 3);
    }

    #[test]
    fn test_text_pair_filter() {
        let catalog = ContentCatalog::bundled();

        // SmallStars pairs are all pictures; memory decks fall back to verbs.
        let text = catalog.text_pairs(LevelId::SmallStars);
        assert!(!text.is_empty());
        assert!(text.iter().all(|e| matches!(e, PairEntry::TextPair { .. })));
    }

    #[test]
    fn test_picture_pair_filter() {
        let catalog = ContentCatalog::bundled();

        // Trailblazers pairs are all text; find-the-pair falls back to animals.
        let pics = catalog.picture_pairs(LevelId::Trailblazers);
        assert_eq!(pics.len(), 8);
    }

    #[test]
    fn test_hotspot_contains() {
        let rect = HotspotRect { top: 40, left: 10, width: 20, height: 10 };
        assert!(rect.contains(10, 40));
        assert!(rect.contains(30, 50));
        assert!(rect.contains(20, 45));
        assert!(!rect.contains(31, 45));
        assert!(!rect.contains(20, 39));
        assert!(!rect.contains(9, 45));
    }

    #[test]
    fn test_scene_items_have_unique_ids() {
        for scene in puzzle_scenes() {
            let mut ids: Vec<u32> = scene.items.iter().map(|i| i.id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), scene.items.len());
        }
    }
}
