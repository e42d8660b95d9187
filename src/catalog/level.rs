//! Levels and Stage Configuration
//!
//! The static level table: which stages a level runs, in what order, with
//! what scoring parameters. Levels with a scene-rotation plan draw their
//! concrete stage list freshly on every selection; everything else is fixed
//! at catalog load.

use serde::{Serialize, Deserialize};

use crate::core::rng::DeterministicRng;

// =============================================================================
// LEVEL ID
// =============================================================================

/// Learner track identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LevelId {
    /// Start your journey here!
    SmallStars = 0,
    /// For faster learners.
    HighFlyers = 1,
    /// Blaze a new path.
    Trailblazers = 2,
    /// Lead the pack!
    Frontrunner = 3,
}

impl LevelId {
    /// All levels in display order.
    pub const ALL: [LevelId; 4] = [
        LevelId::SmallStars,
        LevelId::HighFlyers,
        LevelId::Trailblazers,
        LevelId::Frontrunner,
    ];

    /// Canonical identifier string.
    pub fn as_str(self) -> &'static str {
        match self {
            LevelId::SmallStars => "small_stars",
            LevelId::HighFlyers => "high_flyers",
            LevelId::Trailblazers => "trailblazers",
            LevelId::Frontrunner => "frontrunner",
        }
    }

    /// Parse a canonical identifier string.
    pub fn from_str_id(s: &str) -> Option<LevelId> {
        match s {
            "small_stars" => Some(LevelId::SmallStars),
            "high_flyers" => Some(LevelId::HighFlyers),
            "trailblazers" => Some(LevelId::Trailblazers),
            "frontrunner" => Some(LevelId::Frontrunner),
            _ => None,
        }
    }
}

impl std::fmt::Display for LevelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// SCENE ID
// =============================================================================

/// Puzzle scene identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SceneId {
    /// Clothes in a bedroom.
    Bedroom = 0,
    /// Food in a restaurant.
    Restaurant = 1,
    /// Toys in a playroom.
    Playroom = 2,
}

impl SceneId {
    /// Get from index.
    pub fn from_index(index: u8) -> Option<SceneId> {
        match index {
            0 => Some(SceneId::Bedroom),
            1 => Some(SceneId::Restaurant),
            2 => Some(SceneId::Playroom),
            _ => None,
        }
    }
}

// =============================================================================
// STAGE CONFIGURATION
// =============================================================================

/// Mini-game engine kind for a stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StageKind {
    /// Open cards, match picture/word or word/word pairs.
    PairMatch = 0,
    /// Flip face-down cards hunting one specific pair.
    FindPair = 1,
    /// Drag words into blank sentence slots.
    DragBlank = 2,
    /// Draw lines from pictures to their words.
    LineMatch = 3,
    /// Drag labels onto hotspots in a scene picture.
    Puzzle = 4,
    /// Click letters in order to spell a word.
    Spelling = 5,
    /// Rebuild a sentence from shuffled tokens.
    SentenceBuilder = 6,
    /// Classic card memory with text pairs.
    CardMemory = 7,
}

impl StageKind {
    /// Canonical identifier string.
    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::PairMatch => "match",
            StageKind::FindPair => "find_pair",
            StageKind::DragBlank => "fill_blank",
            StageKind::LineMatch => "line_match",
            StageKind::Puzzle => "puzzle",
            StageKind::Spelling => "spelling",
            StageKind::SentenceBuilder => "sentence_builder",
            StageKind::CardMemory => "text_memory",
        }
    }
}

/// Spelling stage flavor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellingVariant {
    /// Spell the animal shown.
    Animal,
    /// Spell the color of the object shown; first letter scaffolded.
    Color,
}

/// Engine-specific stage parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageParams {
    /// Pair-match parameters.
    PairMatch {
        /// Pairs drawn from the pool.
        pairs: usize,
    },
    /// Find-the-pair parameters.
    FindPair {
        /// Total card slots (12 = 4x3 grid, 9 = 3x3).
        grid_size: usize,
        /// Pairs drawn; a 3x3 grid forces 4.
        pair_count: usize,
    },
    /// Drag-to-blank parameters.
    DragBlank {
        /// Questions drawn from the pool.
        count: usize,
    },
    /// Line-match parameters.
    LineMatch {
        /// Items drawn from the pool.
        items: usize,
    },
    /// Puzzle parameters.
    Puzzle {
        /// Fixed scene, or None to run every scene shuffled.
        scene: Option<SceneId>,
    },
    /// Spelling parameters.
    Spelling {
        /// Animal or color flavor.
        variant: SpellingVariant,
        /// Words drawn (one per round).
        rounds: usize,
        /// Letter grid size.
        grid_size: usize,
    },
    /// Sentence-builder parameters.
    SentenceBuilder {
        /// Scenarios drawn from the pool.
        rounds: usize,
    },
    /// Card-memory parameters.
    CardMemory {
        /// Pairs drawn from the pool.
        pair_count: usize,
    },
}

/// Configuration handed to one mini-game engine. Immutable once mounted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Stage id within its level.
    pub id: u8,
    /// Which engine runs this stage.
    pub kind: StageKind,
    /// Base score the engine starts from or builds toward.
    pub base_score: u32,
    /// Countdown budget in seconds.
    pub time_limit: u32,
    /// Engine-specific parameters.
    pub params: StageParams,
}

// =============================================================================
// LEVELS
// =============================================================================

/// How a level's concrete stage list is produced at selection time.
#[derive(Clone, Debug)]
pub enum StagePlan {
    /// The stage list is exactly the template, every selection.
    Fixed(Vec<StageConfig>),
    /// Puzzle slots in the template get scenes drawn at selection time.
    ///
    /// Scenes are shuffled once per selection and dealt to the template's
    /// puzzle slots in order (cycling if there are more slots than scenes),
    /// so two puzzle stages in one run never play the same scene when enough
    /// scenes exist.
    SceneRotation {
        /// Stage template; puzzle slots carry `scene: None`.
        template: Vec<StageConfig>,
        /// Scenes to rotate through.
        scenes: Vec<SceneId>,
    },
}

/// A learner track: display metadata plus its stage plan.
#[derive(Clone, Debug)]
pub struct Level {
    /// Track identity.
    pub id: LevelId,
    /// Display name.
    pub name: &'static str,
    /// Short tagline for the selection screen.
    pub tagline: &'static str,
    /// Locked tracks reject selection.
    pub locked: bool,
    plan: StagePlan,
}

impl Level {
    /// Produce the concrete stage list for one session run.
    ///
    /// Dynamic plans consume randomness here and nowhere else; the caller
    /// stores the result for the rest of the session so the active game
    /// never changes out from under the player.
    pub fn resolve_stages(&self, rng: &mut DeterministicRng) -> Vec<StageConfig> {
        match &self.plan {
            StagePlan::Fixed(stages) => stages.clone(),
            StagePlan::SceneRotation { template, scenes } => {
                let mut deck: Vec<SceneId> = scenes.clone();
                rng.shuffle(&mut deck);

                let mut dealt = 0usize;
                template
                    .iter()
                    .map(|stage| {
                        let mut stage = stage.clone();
                        if let StageParams::Puzzle { scene } = &mut stage.params {
                            if scene.is_none() && !deck.is_empty() {
                                *scene = Some(deck[dealt % deck.len()]);
                                dealt += 1;
                            }
                        }
                        stage
                    })
                    .collect()
            }
        }
    }

    /// Number of stages a run of this level will have.
    pub fn stage_count(&self) -> usize {
        match &self.plan {
            StagePlan::Fixed(stages) => stages.len(),
            StagePlan::SceneRotation { template, .. } => template.len(),
        }
    }
}

/// The full level table.
#[derive(Clone, Debug)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    /// Build the level table shipped with the game.
    pub fn bundled() -> Self {
        Self {
            levels: vec![
                Level {
                    id: LevelId::SmallStars,
                    name: "Small Stars",
                    tagline: "Start your journey here!",
                    locked: false,
                    plan: StagePlan::Fixed(vec![
                        StageConfig {
                            id: 1,
                            kind: StageKind::FindPair,
                            base_score: 15,
                            time_limit: 30,
                            params: StageParams::FindPair { grid_size: 12, pair_count: 6 },
                        },
                        StageConfig {
                            id: 2,
                            kind: StageKind::LineMatch,
                            base_score: 20,
                            time_limit: 45,
                            params: StageParams::LineMatch { items: 5 },
                        },
                        StageConfig {
                            id: 3,
                            kind: StageKind::Spelling,
                            base_score: 30,
                            time_limit: 60,
                            params: StageParams::Spelling {
                                variant: SpellingVariant::Animal,
                                rounds: 2,
                                grid_size: 9,
                            },
                        },
                        StageConfig {
                            id: 4,
                            kind: StageKind::Spelling,
                            base_score: 20,
                            time_limit: 60,
                            params: StageParams::Spelling {
                                variant: SpellingVariant::Color,
                                rounds: 5,
                                grid_size: 9,
                            },
                        },
                    ]),
                },
                Level {
                    id: LevelId::HighFlyers,
                    name: "High Flyers",
                    tagline: "For faster learners.",
                    locked: false,
                    plan: StagePlan::SceneRotation {
                        template: vec![
                            StageConfig {
                                id: 1,
                                kind: StageKind::Puzzle,
                                base_score: 25,
                                time_limit: 90,
                                params: StageParams::Puzzle { scene: None },
                            },
                            StageConfig {
                                id: 2,
                                kind: StageKind::Puzzle,
                                base_score: 25,
                                time_limit: 90,
                                params: StageParams::Puzzle { scene: None },
                            },
                            StageConfig {
                                id: 3,
                                kind: StageKind::CardMemory,
                                base_score: 30,
                                time_limit: 90,
                                params: StageParams::CardMemory { pair_count: 8 },
                            },
                        ],
                        scenes: vec![SceneId::Bedroom, SceneId::Restaurant, SceneId::Playroom],
                    },
                },
                Level {
                    id: LevelId::Trailblazers,
                    name: "Trailblazers",
                    tagline: "Blaze a new path.",
                    locked: false,
                    plan: StagePlan::Fixed(vec![
                        StageConfig {
                            id: 1,
                            kind: StageKind::PairMatch,
                            base_score: 15,
                            time_limit: 90,
                            params: StageParams::PairMatch { pairs: 8 },
                        },
                        StageConfig {
                            id: 2,
                            kind: StageKind::DragBlank,
                            base_score: 20,
                            time_limit: 120,
                            params: StageParams::DragBlank { count: 5 },
                        },
                    ]),
                },
                Level {
                    id: LevelId::Frontrunner,
                    name: "Frontrunner",
                    tagline: "Lead the pack!",
                    locked: true,
                    plan: StagePlan::Fixed(vec![StageConfig {
                        id: 1,
                        kind: StageKind::PairMatch,
                        base_score: 20,
                        time_limit: 90,
                        params: StageParams::PairMatch { pairs: 8 },
                    }]),
                },
            ],
        }
    }

    /// Look up a level.
    pub fn get(&self, id: LevelId) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// All levels in display order.
    pub fn all(&self) -> &[Level] {
        &self.levels
    }
}

// =============================================================================
// TESTS
// =============================================================================
