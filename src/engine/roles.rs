use crate::models::fixture::SportType;
use crate::models::player::Role;
use crate::util::random::shuffled;

/// Share of All-Rounders above which a cricket side is assumed to be under-specified.
pub const ALL_ROUNDER_THRESHOLD: f64 = 0.6;

const BATSMAN_WORDS: &[&str] = &["bat", "bats", "batsman", "batter", "opening", "middle order", "top order"];
const BOWLER_WORDS: &[&str] = &["bowl", "bowler", "fast", "spin", "pace", "seam", "medium"];
const KEEPER_WORDS: &[&str] = &["keep", "keeper", "wicket", "wk"];
const ALL_ROUNDER_WORDS: &[&str] = &["all", "rounder", "all-rounder"];

const GOALKEEPER_WORDS: &[&str] = &["goalkeeper", "keeper", "gk"];
const DEFENDER_WORDS: &[&str] = &["defender", "defence", "back", "cb", "lb", "rb"];
const MIDFIELDER_WORDS: &[&str] = &["midfielder", "midfield", "mid", "cm", "dm", "am"];
const FORWARD_WORDS: &[&str] = &["forward", "attacker", "striker", "winger", "fw", "st", "lw", "rw"];

fn mentions(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Role when nothing in the position text is recognised.
pub fn default_role(sport: SportType) -> Role {
    match sport {
        SportType::Cricket => Role::AllRounder,
        SportType::Football => Role::Midfielder,
    }
}

/// Keyword classification of a provider position string. Checked in a fixed order, so
/// "wicket-keeper batsman" is a Batsman.
pub fn classify(sport: SportType, position: &str) -> Role {
    let text = position.to_lowercase();
    if text.trim().is_empty() {
        return default_role(sport);
    }
    let ordered: &[(&[&str], Role)] = match sport {
        SportType::Cricket => &[
            (BATSMAN_WORDS, Role::Batsman),
            (BOWLER_WORDS, Role::Bowler),
            (KEEPER_WORDS, Role::WicketKeeper),
            (ALL_ROUNDER_WORDS, Role::AllRounder),
        ],
        SportType::Football => &[
            (GOALKEEPER_WORDS, Role::Goalkeeper),
            (DEFENDER_WORDS, Role::Defender),
            (MIDFIELDER_WORDS, Role::Midfielder),
            (FORWARD_WORDS, Role::Forward),
        ],
    };
    ordered
        .iter()
        .find(|(words, _)| mentions(&text, words))
        .map(|(_, role)| *role)
        .unwrap_or_else(|| default_role(sport))
}

/// Role text from generated output: an exact role name first, then keywords. `None` when the
/// text names no role of `sport`.
pub fn recognise(sport: SportType, text: &str) -> Option<Role> {
    let cleaned = text.trim().trim_matches(|c| c == '(' || c == ')').trim();
    if let Ok(role) = cleaned.parse::<Role>() {
        return (role.sport() == sport).then_some(role);
    }
    let lowered = cleaned.to_lowercase();
    let ordered: &[(&[&str], Role)] = match sport {
        SportType::Cricket => &[
            (ALL_ROUNDER_WORDS, Role::AllRounder),
            (KEEPER_WORDS, Role::WicketKeeper),
            (BATSMAN_WORDS, Role::Batsman),
            (BOWLER_WORDS, Role::Bowler),
        ],
        SportType::Football => &[
            (GOALKEEPER_WORDS, Role::Goalkeeper),
            (DEFENDER_WORDS, Role::Defender),
            (MIDFIELDER_WORDS, Role::Midfielder),
            (FORWARD_WORDS, Role::Forward),
        ],
    };
    ordered
        .iter()
        .find(|(words, _)| mentions(&lowered, words))
        .map(|(_, role)| *role)
}

/// Fixed eleven-player composition for a side.
pub fn template(sport: SportType) -> Vec<Role> {
    let counts: &[(Role, usize)] = match sport {
        SportType::Cricket => &[
            (Role::Batsman, 4),
            (Role::Bowler, 4),
            (Role::AllRounder, 2),
            (Role::WicketKeeper, 1),
        ],
        SportType::Football => &[
            (Role::Goalkeeper, 1),
            (Role::Defender, 4),
            (Role::Midfielder, 4),
            (Role::Forward, 2),
        ],
    };
    counts
        .iter()
        .flat_map(|(role, n)| std::iter::repeat(*role).take(*n))
        .collect()
}

pub fn shuffled_template(sport: SportType) -> Vec<Role> {
    shuffled(&template(sport))
}

/// Reassign the All-Rounders of one cricket side from a shuffled template when they make up more
/// than 60% of it. Returns whether anything was reassigned.
pub fn redistribute(roles: &mut [Role]) -> bool {
    let all_rounders = roles.iter().filter(|r| **r == Role::AllRounder).count();
    if roles.is_empty() || (all_rounders as f64) <= roles.len() as f64 * ALL_ROUNDER_THRESHOLD {
        return false;
    }
    let mut replacements = shuffled_template(SportType::Cricket).into_iter();
    for role in roles.iter_mut().filter(|r| **r == Role::AllRounder) {
        match replacements.next() {
            Some(next) => *role = next,
            None => break,
        }
    }
    true
}
