//! Classification of many words at once.
//!
//! Each word is classified independently; with the `rayon` feature enabled
//! the words are spread over the global thread pool.

use crate::encoding::NielsenThurstonType;
use crate::equipped::EquippedTriangulation;
use crate::laminar_error::LaminarError;

pub type Classified = (String, Result<NielsenThurstonType, LaminarError>);

fn classify(surface: &EquippedTriangulation, word: &str) -> Classified {
    let kind = surface
        .mapping_class(word)
        .and_then(|h| h.nielsen_thurston_type());
    if let Err(e) = &kind {
        log::warn!("classifying {word:?} failed: {e}");
    }
    (word.to_owned(), kind)
}

/// Classifies `words` one after another, keeping their order.
pub fn classify_words_serial<S: AsRef<str>>(
    surface: &EquippedTriangulation,
    words: &[S],
) -> Vec<Classified> {
    words.iter().map(|w| classify(surface, w.as_ref())).collect()
}

/// Parallel [`classify_words_serial`]; the output order matches `words`.
#[cfg(feature = "rayon")]
pub fn classify_words<S: AsRef<str> + Sync>(
    surface: &EquippedTriangulation,
    words: &[S],
) -> Vec<Classified> {
    use rayon::prelude::*;
    words
        .par_iter()
        .map(|w| classify(surface, w.as_ref()))
        .collect()
}

#[cfg(not(feature = "rayon"))]
pub fn classify_words<S: AsRef<str> + Sync>(
    surface: &EquippedTriangulation,
    words: &[S],
) -> Vec<Classified> {
    classify_words_serial(surface, words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipped::s_1_1;

    #[test]
    fn results_follow_input_order() {
        let s = s_1_1().unwrap();
        let words = ["", "ab", "q"];
        let out = classify_words(&s, &words);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], (String::new(), Ok(NielsenThurstonType::Periodic)));
        assert_eq!(out[1].1, Ok(NielsenThurstonType::Periodic));
        assert_eq!(out[2].1, Err(LaminarError::UnknownLetter('q')));
        assert_eq!(out, classify_words_serial(&s, &words));
    }
}
