use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    static ref DELIMITERS: Regex = Regex::new(r"\W+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    pub static ref DEFAULT_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","ain","all","am","an","and","any","are","aren","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","couldn","couldn't",
            "d","did","didn","didn't","do","does","doesn","doesn't","doing","don","don't","down","during",
            "each","few","for","from","further",
            "had","hadn","hadn't","has","hasn","hasn't","have","haven","haven't","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","isn","isn't","it","it's","its","itself",
            "just","ll","m","ma","me","mightn","mightn't","more","most","mustn","mustn't","my","myself",
            "needn","needn't","no","nor","not","now",
            "o","of","off","on","once","only","or","other","our","ours","ourselves","out","over","own",
            "re","s","same","shan","shan't","she","she's","should","should've","shouldn","shouldn't","so","some","such",
            "t","than","that","that'll","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","ve","very",
            "was","wasn","wasn't","we","were","weren","weren't","what","when","where","which","while","who","whom","why","will","with","won","won't","wouldn","wouldn't",
            "y","you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Split one line into candidate tokens.
///
/// The line is trimmed, then split on every run of non-word characters
/// (tabs included). Empty pieces are kept; the term filter rejects them.
pub fn split_line(line: &str) -> Vec<&str> {
    DELIMITERS.split(line.trim()).collect()
}

/// Reduce a filtered token to its Snowball English (Porter2) stem.
pub fn stem(token: &str) -> String {
    STEMMER.stem(token).into_owned()
}

/// Line tokenizer with optional NFKC compatibility folding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer {
    nfkc: bool,
}

impl Tokenizer {
    pub fn new(nfkc: bool) -> Self { Self { nfkc } }

    pub fn split(&self, line: &str) -> Vec<String> {
        if self.nfkc {
            let folded = line.nfkc().collect::<String>();
            split_line(&folded).into_iter().map(str::to_owned).collect()
        } else {
            split_line(line).into_iter().map(str::to_owned).collect()
        }
    }
}
