// Tag tokenization for TF-IDF vectorization
use crate::catalog::Item;
use crate::config::{EngineConfig, TokenizerDialect};

/// Fixed English stopword list (the scikit-learn `english` list)
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together",
    "too", "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up",
    "upon", "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when",
    "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon",
    "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole", "whom",
    "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

/// Check a token against the stopword list, ignoring case
#[inline]
pub fn is_stopword(token: &str) -> bool {
    let lower = token.to_lowercase();
    STOP_WORDS.binary_search(&lower.as_str()).is_ok()
}

/// Splits item tags into vocabulary tokens according to a dialect
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer {
    dialect: TokenizerDialect,
    stopwords: bool,
    delimiter: char,
}

impl Tokenizer {
    #[must_use]
    pub fn new(dialect: TokenizerDialect, stopwords: bool, delimiter: char) -> Self {
        Self {
            dialect,
            stopwords,
            delimiter,
        }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.dialect, config.stopwords, config.tag_delimiter)
    }

    /// Tokens of one item, in tag order, duplicates kept
    pub fn tokenize(&self, item: &Item) -> Vec<String> {
        let tokens: Vec<String> = match self.dialect {
            TokenizerDialect::Whitespace => item
                .tag_text
                .to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            TokenizerDialect::Delimited => item
                .tags(self.delimiter)
                .map(str::to_string)
                .collect(),
        };

        if self.stopwords {
            tokens.into_iter().filter(|t| !is_stopword(t)).collect()
        } else {
            tokens
        }
    }
}
