//! Lump classification.
//!
//! A WAD carries no type information for its lumps, so the kind of each one
//! is inferred from its name and from the section markers seen so far in the
//! directory. The rules below are evaluated top to bottom and the first
//! match wins; several of them overlap on prefixes, so their order matters.

use std::borrow::Cow;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LumpKind {
    Unhandled,
    Ignore,
    Palette,
    Music,
    Sound,
    Flat,
    Sprite,
    Menu,
    Picture,
}

impl LumpKind {
    /// Kinds decoded with the picture decoder. `Unhandled` is included on
    /// purpose: anything unrecognised is tried as a picture.
    pub fn is_picture(self) -> bool {
        matches!(
            self,
            LumpKind::Unhandled | LumpKind::Sprite | LumpKind::Menu | LumpKind::Picture
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum GameVariant {
    #[default]
    Doom,
    Heretic,
    Hexen,
    Strife,
}

/// Section flags carried across the directory scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionState {
    pub in_map: bool,
    pub in_sprites: bool,
    pub in_flats: bool,
}

#[derive(Debug, Clone, Copy)]
enum Test {
    Exact(&'static str),
    Prefix(&'static str),
    /// `ExMy` or `MAPxx`.
    MapMarker,
    InMap,
    InSprites,
    InFlats,
}

impl Test {
    fn matches(self, name: &str, state: &SectionState) -> bool {
        match self {
            Test::Exact(s) => name == s,
            Test::Prefix(s) => name.starts_with(s),
            Test::MapMarker => is_map_marker(name.as_bytes()),
            Test::InMap => state.in_map,
            Test::InSprites => state.in_sprites,
            Test::InFlats => state.in_flats,
        }
    }
}

fn is_map_marker(name: &[u8]) -> bool {
    match name {
        [b'E', e, b'M', m, ..] => e.is_ascii_digit() && m.is_ascii_digit(),
        [b'M', b'A', b'P', a, b, ..] => a.is_ascii_digit() && b.is_ascii_digit(),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    None,
    EnterMap,
    LeaveMap,
    PatchesStart,
    PatchesEnd,
    SpritesStart,
    SpritesEnd,
    FlatsStart,
    FlatsEnd,
}

impl Effect {
    fn apply(self, name: &str, state: &mut SectionState) {
        match self {
            Effect::None => {}
            Effect::EnterMap => {
                debug!("in map section `{}`", name);
                state.in_map = true;
            }
            Effect::LeaveMap => state.in_map = false,
            Effect::PatchesStart => debug!("start of patch lumps"),
            Effect::PatchesEnd => debug!("end of patch lumps"),
            Effect::SpritesStart => {
                debug!("start of sprite lumps");
                state.in_sprites = true;
            }
            Effect::SpritesEnd => {
                debug!("end of sprite lumps");
                state.in_sprites = false;
            }
            Effect::FlatsStart => {
                debug!("start of flat lumps");
                state.in_flats = true;
            }
            Effect::FlatsEnd => {
                debug!("end of flat lumps");
                state.in_flats = false;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    test: Test,
    kind: LumpKind,
    effect: Effect,
}

const fn rule(test: Test, kind: LumpKind) -> Rule {
    Rule {
        test,
        kind,
        effect: Effect::None,
    }
}

const fn marker(name: &'static str, effect: Effect) -> Rule {
    Rule {
        test: Test::Exact(name),
        kind: LumpKind::Ignore,
        effect,
    }
}

use LumpKind::*;
use Test::{InFlats, InMap, InSprites, MapMarker, Prefix};

/// Map bracketing and structural lumps that are not assets.
const STRUCTURAL_RULES: &[Rule] = &[
    // BLOCKMAP closes a map whether or not one was opened.
    marker("BLOCKMAP", Effect::LeaveMap),
    rule(InMap, Ignore),
    // diminished lighting tables
    rule(Prefix("COLORMAP"), Ignore),
    // DOS exit text
    rule(Prefix("ENDOOM"), Ignore),
    rule(Prefix("DEMO"), Ignore),
    Rule {
        test: MapMarker,
        kind: Ignore,
        effect: Effect::EnterMap,
    },
    // wall texture composition
    rule(Prefix("TEXTURE"), Ignore),
    rule(Prefix("PNAMES"), Ignore),
    rule(Prefix("GENMIDI"), Ignore),
    rule(Prefix("DMXGUS"), Ignore),
    // PC speaker sounds
    rule(Prefix("DP"), Ignore),
    // translucency tables
    rule(Prefix("TINTTAB"), Ignore),
    rule(Prefix("XLATAB"), Ignore),
];

const NO_RULES: &[Rule] = &[];

const HERETIC_IGNORED_RULES: &[Rule] = &[
    rule(Prefix("AUTOPAGE"), Ignore),
    rule(Prefix("SNDCURVE"), Ignore),
    rule(Prefix("CHAT"), Ignore),
    rule(Prefix("ARTIUSE"), Ignore),
];

const SECTION_RULES: &[Rule] = &[
    marker("P_START", Effect::PatchesStart),
    marker("P1_START", Effect::PatchesStart),
    marker("P2_START", Effect::PatchesStart),
    marker("P3_START", Effect::PatchesStart),
    marker("PP_START", Effect::PatchesStart),
    marker("P_END", Effect::PatchesEnd),
    marker("P1_END", Effect::PatchesEnd),
    marker("P2_END", Effect::PatchesEnd),
    marker("P3_END", Effect::PatchesEnd),
    marker("PP_END", Effect::PatchesEnd),
    marker("S_START", Effect::SpritesStart),
    marker("S1_START", Effect::SpritesStart),
    marker("S2_START", Effect::SpritesStart),
    marker("SS_START", Effect::SpritesStart),
    marker("S_END", Effect::SpritesEnd),
    marker("S1_END", Effect::SpritesEnd),
    marker("S2_END", Effect::SpritesEnd),
    marker("SS_END", Effect::SpritesEnd),
    marker("F_START", Effect::FlatsStart),
    marker("F1_START", Effect::FlatsStart),
    marker("F2_START", Effect::FlatsStart),
    marker("F3_START", Effect::FlatsStart),
    marker("FF_START", Effect::FlatsStart),
    marker("F_END", Effect::FlatsEnd),
    marker("F1_END", Effect::FlatsEnd),
    marker("F2_END", Effect::FlatsEnd),
    marker("F3_END", Effect::FlatsEnd),
    marker("FF_END", Effect::FlatsEnd),
    rule(Prefix("M_"), Menu),
    rule(InSprites, Sprite),
    rule(InFlats, Flat),
    rule(Prefix("PLAYPAL"), Palette),
    rule(Prefix("WALL"), Picture),
    rule(Prefix("SKY"), Picture),
];

const DOOM_FALLBACK_RULES: &[Rule] = &[rule(Prefix("DS"), Sound), rule(Prefix("D_"), Music)];

const HERETIC_FALLBACK_RULES: &[Rule] = &[
    // graphics living outside the sprite section
    rule(Prefix("SP"), Sprite),
    rule(Prefix("BKEY"), Picture),
    rule(Prefix("YKEY"), Picture),
    rule(Prefix("GKEY"), Picture),
    rule(Prefix("BOR"), Picture),
    rule(Prefix("GOD"), Picture),
    rule(Prefix("PAUSED"), Menu),
    rule(Prefix("MUS_"), Music),
    // Not in picture format; the fullscreen ones are raw 320x200 pages.
    rule(Prefix("FONT"), Ignore),
    rule(Prefix("PATA"), Ignore),
    rule(Prefix("LOADING"), Ignore),
    rule(Prefix("TITLE"), Ignore),
    rule(Prefix("ORDER"), Ignore),
    rule(Prefix("HELP"), Ignore),
    rule(Prefix("CREDIT"), Ignore),
    rule(Prefix("ENDTEXT"), Ignore),
];

/// Sound effect labels of the shareware Heretic IWAD.
pub const HERETIC_SOUNDS: &[&str] = &[
    "GFRAG", "GLDHIT", "GNTFUL", "GNTHIT", "GNTPOW", "GNTACT", "GNTUSE", "BOWSHT", "HRNHIT",
    "STFHIT", "STFPOW", "STFCRK", "BLSSHT", "BLSHIT", "PHOHIT", "IMPSIT", "IMPAT1", "IMPAT2",
    "IMPDTH", "IMPPAI", "MUMSIT", "MUMAT1", "MUMAT2", "MUMDTH", "MUMPAI", "KGTSIT", "KGTATK",
    "KGTAT2", "KGTDTH", "KGTPAI", "WIZSIT", "WIZATK", "WIZDTH", "WIZACT", "WIZPAI", "HEDSIT",
    "HEDAT1", "HEDAT2", "HEDAT3", "HEDDTH", "HEDACT", "HEDPAI", "PLROOF", "PLRPAI", "PLRDTH",
    "PLRWDTH", "PLRCDTH", "GIBDTH", "ITEMUP", "WPNUP", "ARTIUP", "KEYUP", "TELEPT", "DOROPN",
    "DORCLS", "DORMOV", "SWITCH", "PSTART", "PSTOP", "STNMOV", "WIND", "CHICPAI", "CHICATK",
    "CHICDTH", "CHICACT", "CHICPK1", "CHICPK2", "CHICPK3", "RIPSLOP", "NEWPOD", "PODEXP", "BURN",
    "GLOOP", "MUMHED", "RESPAWN", "AMB3", "AMB4", "AMB5", "AMB6", "AMB7", "AMB9", "AMB10",
    "AMB11",
];

/// Sound labels recognised by name prefix, for games whose sounds have no
/// common prefix of their own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoundCatalog {
    labels: Vec<Cow<'static, str>>,
}

impl SoundCatalog {
    pub fn for_game(game: GameVariant) -> Self {
        match game {
            GameVariant::Heretic => Self {
                labels: HERETIC_SOUNDS.iter().map(|&s| Cow::Borrowed(s)).collect(),
            },
            _ => Self::default(),
        }
    }

    pub fn extend<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels
            .extend(labels.into_iter().map(|s| Cow::Owned(s.into())));
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.labels.iter().any(|label| name.starts_with(label.as_ref()))
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    game: GameVariant,
    sounds: SoundCatalog,
}

impl Classifier {
    pub fn new(game: GameVariant) -> Self {
        Self::with_sounds(game, SoundCatalog::for_game(game))
    }

    pub fn with_sounds(game: GameVariant, sounds: SoundCatalog) -> Self {
        Self { game, sounds }
    }

    pub fn game(&self) -> GameVariant {
        self.game
    }

    fn rules(&self) -> impl Iterator<Item = &'static Rule> {
        let (ignored, fallback) = match self.game {
            GameVariant::Heretic => (HERETIC_IGNORED_RULES, HERETIC_FALLBACK_RULES),
            _ => (NO_RULES, DOOM_FALLBACK_RULES),
        };

        STRUCTURAL_RULES
            .iter()
            .chain(ignored)
            .chain(SECTION_RULES)
            .chain(fallback)
    }

    /// Classifies one lump and returns the section state to carry on to the
    /// next directory entry. Only the name and the incoming state are
    /// consulted.
    pub fn classify(&self, name: &str, state: SectionState) -> (LumpKind, SectionState) {
        let mut next = state;

        if let Some(rule) = self.rules().find(|r| r.test.matches(name, &state)) {
            rule.effect.apply(name, &mut next);
            return (rule.kind, next);
        }

        if self.sounds.matches(name) {
            return (Sound, next);
        }

        (Unhandled, next)
    }
}

/// Classifies with the stock sound catalog for `game`.
pub fn classify(name: &str, game: GameVariant, state: SectionState) -> (LumpKind, SectionState) {
    Classifier::new(game).classify(name, state)
}
