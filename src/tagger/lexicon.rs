//! Deterministic rule-and-lexicon English tagger.
//!
//! Closed-class words come from fixed tables, open-class words from a small
//! lexicon plus suffix heuristics and one token of left context. Tags use
//! the universal coarse inventory and Penn Treebank fine tags, so the output
//! has the same shape as a statistical tagger's.

use super::tags::*;
use super::{TaggedToken, Tagger};
use crate::error::TaggerError;

const NAME: &str = "lexicon-en-0.1";

/// Rule-based tagger shipped with the crate.
#[derive(Debug, Clone, Default)]
pub struct LexiconTagger;

impl LexiconTagger {
    pub fn new() -> Self {
        Self
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, TaggerError> {
        if text.contains('\0') {
            return Err(TaggerError::Failed {
                reason: "text contains NUL bytes".to_string(),
            });
        }

        let mut tokens: Vec<TaggedToken> = Vec::new();
        for piece in split_pieces(text) {
            let token = match piece {
                Piece::Space(s) => TaggedToken::new(s, SPACE, "_SP"),
                Piece::Punct(s) => {
                    let fine = punct_fine_tag(&s);
                    TaggedToken::new(s, PUNCT, fine)
                }
                Piece::Word(w) => {
                    let sentence_start = tokens.last().map_or(true, starts_sentence);
                    let (coarse, fine) = tag_word(&w, tokens.last(), sentence_start);
                    TaggedToken::new(w, coarse, fine)
                }
            };
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn name(&self) -> &str {
        NAME
    }
}

#[derive(Debug, PartialEq)]
enum Piece {
    Word(String),
    Punct(String),
    Space(String),
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '\'' || c == '\u{2019}'
}

/// Split text into words, punctuation runs and line breaks.
///
/// Plain spaces are dropped; whitespace runs containing a newline become a
/// single space token, the way lyric line breaks come out of most taggers.
fn split_pieces(text: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, first)) = chars.peek() {
        let mut end = start;
        if first.is_whitespace() {
            let mut newline = false;
            while let Some(&(i, c)) = chars.peek() {
                if !c.is_whitespace() {
                    break;
                }
                newline |= c == '\n';
                end = i + c.len_utf8();
                chars.next();
            }
            if newline {
                pieces.push(Piece::Space(text[start..end].to_string()));
            }
        } else if is_word_char(first) {
            while let Some(&(i, c)) = chars.peek() {
                if !is_word_char(c) {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }
            push_word(&mut pieces, &text[start..end].replace('\u{2019}', "'"));
        } else {
            while let Some(&(i, c)) = chars.peek() {
                if c != first {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }
            pieces.push(Piece::Punct(text[start..end].to_string()));
        }
    }

    pieces
}

const LEADING_APOSTROPHE_WORDS: &[&str] = &["'em", "'cause", "'til", "'bout", "'round"];

fn push_word(pieces: &mut Vec<Piece>, raw: &str) {
    let mut word = raw;

    if word.chars().all(|c| c == '\'') {
        pieces.push(Piece::Punct(word.to_string()));
        return;
    }

    if word.starts_with('\'')
        && !LEADING_APOSTROPHE_WORDS
            .iter()
            .any(|w| w.eq_ignore_ascii_case(word))
    {
        let body = word.trim_start_matches('\'');
        pieces.push(Piece::Punct(word[..word.len() - body.len()].to_string()));
        word = body;
    }

    let mut trailing = "";
    if word.ends_with('\'') && !ends_with_ignore_case(word, "in'") {
        let body = word.trim_end_matches('\'');
        trailing = &word[body.len()..];
        word = body;
    }

    match split_contraction(word) {
        (stem, Some(clitic)) => {
            pieces.push(Piece::Word(stem.to_string()));
            pieces.push(Piece::Word(clitic.to_string()));
        }
        (stem, None) => pieces.push(Piece::Word(stem.to_string())),
    }

    if !trailing.is_empty() {
        pieces.push(Piece::Punct(trailing.to_string()));
    }
}

fn ends_with_ignore_case(word: &str, suffix: &str) -> bool {
    word.len() >= suffix.len()
        && word.is_char_boundary(word.len() - suffix.len())
        && word[word.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

const CLITICS: &[&str] = &["'m", "'s", "'re", "'ll", "'ve", "'d"];

/// Split English clitics off a word: `don't` -> `do` + `n't`.
fn split_contraction(word: &str) -> (&str, Option<&str>) {
    if word.len() > 3 && ends_with_ignore_case(word, "n't") {
        let cut = word.len() - 3;
        // "can't" and "won't" keep the tagger convention `ca`/`wo`.
        if word.eq_ignore_ascii_case("can't") || word.eq_ignore_ascii_case("won't") {
            return (&word[..2], Some(&word[2..]));
        }
        return (&word[..cut], Some(&word[cut..]));
    }

    for clitic in CLITICS {
        if word.len() > clitic.len() && ends_with_ignore_case(word, clitic) {
            let cut = word.len() - clitic.len();
            return (&word[..cut], Some(&word[cut..]));
        }
    }

    (word, None)
}

fn starts_sentence(prev: &TaggedToken) -> bool {
    prev.coarse == SPACE || (prev.coarse == PUNCT && prev.fine == ".")
}

fn punct_fine_tag(punct: &str) -> &'static str {
    match punct.chars().next() {
        Some('.') | Some('!') | Some('?') => ".",
        Some(',') => ",",
        Some(':') | Some(';') | Some('-') | Some('\u{2014}') => ":",
        Some('"') | Some('\'') | Some('\u{201c}') | Some('\u{201d}') => "''",
        Some('(') | Some('[') | Some('{') => "-LRB-",
        Some(')') | Some(']') | Some('}') => "-RRB-",
        Some('$') => "$",
        _ => "NFP",
    }
}

fn closed_class(word: &str) -> Option<(&'static str, &'static str)> {
    let tag = match word {
        "i" | "you" | "he" | "she" | "it" | "we" | "they" | "me" | "him" | "her" | "us"
        | "them" | "'em" | "y'all" | "ya" | "u" => (PRON, "PRP"),
        "myself" | "yourself" | "himself" | "herself" | "itself" | "ourselves"
        | "yourselves" | "themselves" => (PRON, "PRP"),
        "mine" | "yours" | "hers" | "ours" | "theirs" => (PRON, "PRP"),
        "my" | "your" | "his" | "its" | "our" | "their" => (PRON, "PRP$"),
        "who" | "whom" | "what" => (PRON, "WP"),
        "whose" => (PRON, "WP$"),
        "something" | "nothing" | "anything" | "everything" | "someone" | "somebody"
        | "anyone" | "anybody" | "everyone" | "everybody" | "nobody" => (PRON, "NN"),

        "the" | "a" | "an" | "this" | "that" | "these" | "those" | "every" | "each"
        | "some" | "any" | "no" | "all" | "both" | "another" | "either" | "neither" => {
            (DET, "DT")
        }
        "which" | "whatever" => (DET, "WDT"),

        "am" | "'m" | "are" | "'re" => (AUX, "VBP"),
        "is" | "'s" => (AUX, "VBZ"),
        "was" | "were" => (AUX, "VBD"),
        "be" => (AUX, "VB"),
        "been" => (AUX, "VBN"),
        "being" => (AUX, "VBG"),
        "have" | "'ve" | "do" => (AUX, "VBP"),
        "has" | "does" => (AUX, "VBZ"),
        "had" | "'d" | "did" => (AUX, "VBD"),
        "will" | "'ll" | "wo" | "would" | "shall" | "should" | "can" | "ca" | "could"
        | "may" | "might" | "must" => (AUX, "MD"),

        "not" | "n't" => (PART, "RB"),
        "to" => (PART, "TO"),

        "and" | "or" | "but" | "nor" => (CCONJ, "CC"),
        "if" | "because" | "'cause" | "cause" | "while" | "although" | "though" | "unless"
        | "whether" | "than" | "as" | "till" | "'til" => (SCONJ, "IN"),
        "in" | "on" | "at" | "by" | "for" | "with" | "from" | "of" | "about" | "'bout"
        | "into" | "over" | "under" | "through" | "without" | "within" | "around"
        | "'round" | "before" | "after" | "since" | "until" | "upon" | "across"
        | "between" | "against" | "inside" | "outside" | "like" => (ADP, "IN"),
        "up" | "down" | "out" | "off" => (ADP, "RP"),

        "oh" | "ooh" | "yeah" | "yea" | "hey" | "uh" | "ah" | "whoa" | "yo" | "na" | "la"
        | "huh" | "ayy" | "mmm" | "woah" => (INTJ, "UH"),

        "when" | "where" | "why" | "how" => (ADV, "WRB"),
        "very" | "really" | "just" | "never" | "always" | "now" | "then" | "here"
        | "there" | "so" | "too" | "also" | "still" | "ever" | "again" | "back" | "only"
        | "even" | "maybe" | "tonight" | "forever" | "together" | "sometimes" | "yet"
        | "already" | "soon" | "away" | "right" => (ADV, "RB"),

        "one" | "two" | "three" | "four" | "five" | "six" | "seven" | "eight" | "nine"
        | "ten" | "hundred" | "thousand" | "million" => (NUM, "CD"),

        "gonna" | "wanna" | "gotta" => (VERB, "VBG"),
        _ => return None,
    };
    Some(tag)
}

const BASE_VERBS: &[&str] = &[
    "love", "know", "want", "go", "get", "feel", "make", "say", "see", "take", "come", "give",
    "need", "think", "let", "tell", "keep", "hold", "try", "leave", "call", "run", "stay",
    "believe", "dance", "break", "fall", "hear", "look", "find", "cry", "live", "die", "talk",
    "walk", "play", "turn", "put", "bring", "show", "start", "stop", "wait", "move", "hurt",
    "remember", "forget", "lose", "win", "touch", "kiss", "hate", "miss", "pray", "shine",
    "sing", "ride", "fly", "drop", "pull", "push", "burn", "change", "save", "ask", "watch",
    "work", "pay", "spend", "shake", "rise", "sleep", "dream", "fight", "hide", "smile",
];

const PAST_VERBS: &[&str] = &[
    "got", "said", "made", "knew", "went", "came", "took", "gave", "told", "felt", "left",
    "thought", "saw", "lost", "fell", "broke", "heard", "found", "kept", "held", "ran", "won",
    "brought", "paid", "spent", "stood", "sat", "wrote", "bought", "caught", "taught",
];

const PARTICIPLES: &[&str] = &[
    "gone", "done", "known", "seen", "taken", "given", "broken", "fallen", "forgotten",
    "written", "chosen", "frozen", "stolen", "driven", "hidden", "shaken",
];

const ADJECTIVES: &[&str] = &[
    "good", "bad", "new", "old", "big", "little", "young", "real", "wrong", "free", "high",
    "low", "cold", "hot", "sweet", "crazy", "true", "alone", "long", "last", "whole", "own",
    "same", "sure", "other", "lonely", "ready", "happy", "pretty", "dark", "deep", "strong",
    "wild", "fine", "rich", "poor", "fresh", "blue", "red", "black", "white", "gold", "slow",
    "fast", "easy", "hard", "late", "early", "lovely", "holy", "silly", "ugly",
];

const COMPARATIVES: &[(&str, &str)] = &[
    ("better", "JJR"),
    ("worse", "JJR"),
    ("more", "JJR"),
    ("less", "JJR"),
    ("best", "JJS"),
    ("worst", "JJS"),
    ("most", "JJS"),
    ("least", "JJS"),
];

fn is_base_verb(word: &str) -> bool {
    BASE_VERBS.contains(&word)
}

/// Third-person singular form of a lexicon verb (`loves`, `cries`, `goes`).
fn is_third_person_verb(word: &str) -> bool {
    if let Some(stem) = word.strip_suffix("ies") {
        return is_base_verb(&format!("{}y", stem));
    }
    if let Some(stem) = word.strip_suffix("es") {
        if is_base_verb(stem) {
            return true;
        }
    }
    word.strip_suffix('s').map_or(false, is_base_verb)
}

fn nominal_context(prev: Option<&TaggedToken>) -> bool {
    prev.map_or(false, |p| {
        p.coarse == DET || p.coarse == ADJ || p.fine == "PRP$"
    })
}

fn verbal_context(prev: Option<&TaggedToken>) -> bool {
    prev.map_or(false, |p| p.fine == "TO" || p.fine == "MD" || p.fine == "PRP")
}

fn tag_word(
    word: &str,
    prev: Option<&TaggedToken>,
    sentence_start: bool,
) -> (&'static str, &'static str) {
    let lower = word.to_lowercase();

    if let Some(tag) = closed_class(&lower) {
        return tag;
    }

    if lower.chars().all(|c| c.is_ascii_digit()) {
        return (NUM, "CD");
    }

    if let Some((_, fine)) = COMPARATIVES.iter().find(|(w, _)| *w == lower) {
        return (ADJ, fine);
    }

    if ADJECTIVES.contains(&lower.as_str()) {
        return (ADJ, "JJ");
    }

    if is_base_verb(&lower) {
        if nominal_context(prev) {
            return (NOUN, "NN");
        }
        if verbal_context(prev) {
            return (VERB, if prev.map_or(false, |p| p.fine == "PRP") { "VBP" } else { "VB" });
        }
        return (VERB, "VB");
    }

    if is_third_person_verb(&lower) {
        return if nominal_context(prev) {
            (NOUN, "NNS")
        } else {
            (VERB, "VBZ")
        };
    }

    if PAST_VERBS.contains(&lower.as_str()) {
        return (VERB, "VBD");
    }

    if PARTICIPLES.contains(&lower.as_str()) {
        return (VERB, "VBN");
    }

    let capitalized = word.chars().next().map_or(false, char::is_uppercase);
    if capitalized && !sentence_start {
        return (PROPN, "NNP");
    }

    let long = lower.chars().count() > 3;
    if long && lower.ends_with("ly") {
        return (ADV, "RB");
    }
    if long && (lower.ends_with("ing") || lower.ends_with("in'")) {
        return (VERB, "VBG");
    }
    if long && lower.ends_with("ed") {
        return (VERB, "VBD");
    }
    if long && lower.ends_with("est") && lower.chars().count() > 5 {
        return (ADJ, "JJS");
    }
    const ADJ_SUFFIXES: &[&str] = &[
        "ous", "ful", "ive", "able", "ible", "less", "ic", "ish", "ary",
    ];
    if long && ADJ_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        return (ADJ, "JJ");
    }
    if long && lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") {
        return (NOUN, "NNS");
    }

    (NOUN, "NN")
}
