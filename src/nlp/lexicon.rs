use std::collections::HashMap;
use std::sync::OnceLock;

/// Mean human valence ratings on a -4..=4 scale, lowercase.
const VALENCES: &[(&str, f64)] = &[
    // positive
    ("accomplish", 1.8), ("accomplished", 1.9), ("achieve", 1.9), ("achievement", 2.1),
    ("advance", 1.3), ("advances", 1.2), ("agree", 1.5), ("agreed", 1.1), ("agreement", 2.2),
    ("aid", 1.6), ("amazing", 2.8), ("applaud", 2.0), ("award", 2.5), ("awarded", 1.7),
    ("beautiful", 2.9), ("benefit", 2.0), ("benefits", 1.6), ("best", 3.2), ("better", 1.9),
    ("boost", 1.7), ("boosted", 1.5), ("brave", 2.4), ("breakthrough", 2.2), ("bright", 1.9),
    ("calm", 1.3), ("celebrate", 2.7), ("celebrated", 2.7), ("celebration", 2.9),
    ("champion", 2.9), ("cheer", 2.3), ("clean", 1.7), ("comfort", 1.5), ("confident", 2.2),
    ("cure", 1.8), ("delight", 2.9), ("easy", 1.9), ("effective", 2.1), ("encourage", 2.3),
    ("encouraging", 2.4), ("enjoy", 2.2), ("excellent", 2.7), ("excited", 1.4),
    ("exciting", 2.2), ("fair", 1.3), ("favorable", 2.1), ("free", 2.3), ("freedom", 3.2),
    ("fresh", 1.3), ("friendly", 2.2), ("fun", 2.3), ("gain", 2.4), ("gains", 1.4),
    ("generous", 2.3), ("glad", 2.0), ("good", 1.9), ("great", 3.1), ("grow", 1.6),
    ("growth", 1.6), ("happy", 2.7), ("heal", 1.4), ("healthy", 1.7), ("help", 1.7),
    ("helped", 1.6), ("helpful", 1.9), ("hero", 2.6), ("hope", 1.9), ("hopeful", 2.3),
    ("improve", 1.9), ("improved", 2.1), ("improvement", 2.0), ("innovative", 1.9),
    ("inspire", 2.7), ("inspiring", 2.4), ("joy", 2.8), ("kind", 2.4), ("laugh", 2.6),
    ("like", 1.5), ("love", 3.2), ("loved", 2.9), ("lucky", 1.8), ("optimism", 2.5),
    ("optimistic", 1.3), ("peace", 2.5), ("peaceful", 2.2), ("pleased", 1.9), ("popular", 1.8),
    ("positive", 2.6), ("progress", 1.8), ("promising", 1.7), ("prosper", 2.1),
    ("protect", 1.6), ("protected", 1.9), ("proud", 2.1), ("rally", 0.9), ("rallied", 0.9),
    ("record", 0.5), ("recover", 1.7), ("recovery", 1.4), ("relief", 2.1), ("rescue", 2.0),
    ("rescued", 1.8), ("reward", 2.1), ("rise", 0.8), ("safe", 1.9), ("safety", 1.8),
    ("save", 2.2), ("saved", 1.7), ("secure", 1.4), ("smile", 1.5), ("soar", 1.6),
    ("soared", 1.4), ("solution", 1.3), ("stable", 1.2), ("strong", 2.3), ("stronger", 1.6),
    ("succeed", 2.2), ("success", 2.7), ("successful", 2.8), ("support", 1.7),
    ("supported", 1.3), ("surge", 0.8), ("thank", 1.5), ("thrilled", 2.1), ("thrive", 2.2),
    ("top", 0.8), ("triumph", 2.9), ("trust", 2.3), ("united", 1.8), ("victory", 2.8),
    ("welcome", 2.0), ("win", 2.8), ("winning", 2.4), ("wins", 2.7), ("won", 2.7),
    ("wonderful", 2.7),
    // negative
    ("abuse", -3.2), ("accident", -2.1), ("accused", -1.6), ("afraid", -2.2), ("alarm", -1.4),
    ("anger", -2.7), ("angry", -2.3), ("arrest", -1.4), ("arrested", -2.1), ("attack", -2.1),
    ("attacked", -2.0), ("bad", -2.5), ("ban", -2.6), ("bankrupt", -2.6), ("battle", -1.6),
    ("blame", -1.4), ("bomb", -2.2), ("broken", -2.1), ("collapse", -2.2),
    ("collapsed", -1.8), ("concern", -1.1), ("concerns", -0.9), ("conflict", -1.3),
    ("crash", -1.7), ("crisis", -3.1), ("critical", -1.3), ("criticism", -1.9),
    ("crime", -2.5), ("cut", -1.1), ("cuts", -1.2), ("danger", -2.4), ("dangerous", -2.1),
    ("dead", -3.3), ("death", -2.9), ("deaths", -2.6), ("decline", -1.1), ("defeat", -2.0),
    ("deficit", -1.7), ("destroy", -2.5), ("destroyed", -2.8), ("devastating", -3.1),
    ("die", -2.9), ("died", -2.6), ("disaster", -3.1), ("disease", -1.7), ("dispute", -1.7),
    ("drop", -1.1), ("dropped", -0.6), ("emergency", -1.6), ("fail", -2.5),
    ("failed", -2.3), ("failure", -2.3), ("fall", -0.8), ("fear", -2.2), ("fears", -1.8),
    ("fell", -0.6), ("fight", -1.6), ("fire", -1.4), ("fraud", -2.8), ("grief", -2.2),
    ("guilty", -1.8), ("harm", -2.5), ("hate", -2.7), ("hurt", -2.4), ("illegal", -2.6),
    ("injured", -1.7), ("injury", -1.8), ("kill", -3.7), ("killed", -3.5), ("killing", -3.4),
    ("lawsuit", -0.9), ("lose", -1.6), ("loss", -1.3), ("losses", -1.7), ("lost", -1.3),
    ("murder", -3.7), ("outrage", -2.3), ("pain", -2.3), ("panic", -2.5), ("plunge", -1.4),
    ("plunged", -1.3), ("poor", -2.1), ("problem", -1.7), ("problems", -1.7),
    ("protest", -1.0), ("recession", -1.8), ("reject", -1.7), ("rejected", -1.3),
    ("risk", -1.1), ("sad", -2.1), ("scandal", -1.9), ("shooting", -2.2), ("shortage", -1.4),
    ("sick", -2.3), ("slump", -1.5), ("storm", -1.4), ("strike", -0.6), ("struggle", -1.3),
    ("struggling", -1.8), ("suffer", -2.4), ("suspect", -1.2), ("terrible", -2.1),
    ("terror", -3.0), ("threat", -2.4), ("threaten", -2.0), ("threatened", -2.0),
    ("tragedy", -3.4), ("tragic", -3.2), ("trouble", -1.7), ("uncertain", -1.2),
    ("uncertainty", -1.4), ("victim", -2.2), ("victims", -2.1), ("violence", -3.1),
    ("war", -2.9), ("warn", -0.4), ("warning", -1.4), ("weak", -1.9), ("worried", -1.2),
    ("worry", -1.9), ("worse", -2.1), ("worst", -3.1), ("wounded", -2.3),
];

/// Intensifiers and dampeners adjust a following sentiment word.
const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", 0.293), ("deeply", 0.293), ("enormously", 0.293), ("extremely", 0.293),
    ("highly", 0.293), ("hugely", 0.293), ("incredibly", 0.293), ("most", 0.293),
    ("particularly", 0.293), ("really", 0.293), ("remarkably", 0.293), ("so", 0.293),
    ("sharply", 0.293), ("significantly", 0.293), ("totally", 0.293), ("very", 0.293),
    ("barely", -0.293), ("hardly", -0.293), ("less", -0.293), ("marginally", -0.293),
    ("partly", -0.293), ("scarcely", -0.293), ("slightly", -0.293), ("somewhat", -0.293),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "nowhere", "cannot",
    "without", "isnt", "arent", "wasnt", "werent", "dont", "doesnt", "didnt", "wont",
    "wouldnt", "shouldnt", "couldnt", "cant", "hasnt", "havent", "hadnt",
];

static VALENCE_MAP: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();
static BOOSTER_MAP: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();

pub fn valence(word: &str) -> Option<f64> {
    VALENCE_MAP
        .get_or_init(|| VALENCES.iter().copied().collect())
        .get(word)
        .copied()
}

pub fn booster(word: &str) -> Option<f64> {
    BOOSTER_MAP
        .get_or_init(|| BOOSTERS.iter().copied().collect())
        .get(word)
        .copied()
}

pub fn is_negation(word: &str) -> bool {
    let word = word.to_lowercase();
    if word.ends_with("n't") || word.ends_with("n’t") {
        return true;
    }
    NEGATIONS.contains(&word.replace(['\'', '’'], "").as_str())
}
