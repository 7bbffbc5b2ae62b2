//! Descriptive counts over the raw document set.

use crate::analysis::frequency::FrequencyTable;
use crate::models::{bucket_for, Document, TimeBucket};
use serde::Serialize;

/// Mean popularity of one genre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenrePopularity {
    pub genre: String,
    pub rated: usize,
    pub mean: f64,
}

/// Shape of a corpus before annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusProfile {
    pub documents: usize,
    pub missing_text: usize,
    pub missing_popularity: usize,
    pub missing_explicit: usize,
    pub explicit: usize,
    /// Earliest and latest release year.
    pub year_range: Option<(i32, i32)>,
    /// Documents outside every time bucket.
    pub unbucketed: usize,
    pub genres: FrequencyTable,
    pub emotions: FrequencyTable,
    /// Documents per bucket, in bucket order.
    pub buckets: FrequencyTable,
}

impl CorpusProfile {
    pub fn from_documents(documents: &[Document], buckets: &[TimeBucket]) -> Self {
        let mut bucket_table = FrequencyTable::new();
        for bucket in buckets {
            bucket_table.add(&bucket.label, 0);
        }

        let mut profile = Self {
            documents: documents.len(),
            missing_text: 0,
            missing_popularity: 0,
            missing_explicit: 0,
            explicit: 0,
            year_range: None,
            unbucketed: 0,
            genres: FrequencyTable::new(),
            emotions: FrequencyTable::new(),
            buckets: bucket_table,
        };

        for doc in documents {
            if doc.text.as_deref().map_or(true, |t| t.trim().is_empty()) {
                profile.missing_text += 1;
            }
            if doc.popularity.is_none() {
                profile.missing_popularity += 1;
            }
            match doc.explicit {
                Some(true) => profile.explicit += 1,
                Some(false) => {}
                None => profile.missing_explicit += 1,
            }

            let year = doc.release_year;
            profile.year_range = Some(match profile.year_range {
                Some((lo, hi)) => (lo.min(year), hi.max(year)),
                None => (year, year),
            });

            profile.genres.add(&doc.genre, 1);
            profile.emotions.add(&doc.emotion, 1);
            match bucket_for(buckets, year) {
                Some(bucket) => profile.buckets.add(&bucket.label, 1),
                None => profile.unbucketed += 1,
            }
        }

        profile
    }

    /// Share of flagged documents that are explicit, in percent.
    pub fn explicit_share(&self) -> Option<f64> {
        let flagged = self.documents - self.missing_explicit;
        if flagged == 0 {
            None
        } else {
            Some(self.explicit as f64 / flagged as f64 * 100.0)
        }
    }
}

/// Emotion counts, optionally restricted to one genre.
pub fn emotion_distribution(documents: &[Document], genre: Option<&str>) -> FrequencyTable {
    FrequencyTable::from_labels(
        documents
            .iter()
            .filter(|d| genre.map_or(true, |g| d.genre == g))
            .map(|d| d.emotion.as_str()),
    )
}

/// Mean popularity per genre, genres in first-seen order. Genres without
/// any rated document are left out.
pub fn popularity_by_genre(documents: &[Document]) -> Vec<GenrePopularity> {
    let mut sums: Vec<(String, usize, f64)> = Vec::new();
    for doc in documents {
        let Some(score) = doc.popularity else {
            continue;
        };
        match sums.iter_mut().find(|(genre, _, _)| *genre == doc.genre) {
            Some(entry) => {
                entry.1 += 1;
                entry.2 += score;
            }
            None => sums.push((doc.genre.clone(), 1, score)),
        }
    }

    sums.into_iter()
        .map(|(genre, rated, total)| GenrePopularity {
            genre,
            rated,
            mean: total / rated as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Document> {
        let mut untitled = Document::new("", "rock", 1985, "calm");
        untitled.text = None;
        vec![
            Document::new("a", "pop", 1995, "joy")
                .with_explicit(false)
                .with_popularity(50.0),
            Document::new("b", "hip hop", 2005, "anger")
                .with_explicit(true)
                .with_popularity(70.0),
            Document::new("c", "pop", 2015, "joy").with_popularity(30.0),
            untitled,
        ]
    }

    #[test]
    fn test_profile_counts() {
        let profile = CorpusProfile::from_documents(&sample(), &TimeBucket::decades());

        assert_eq!(profile.documents, 4);
        assert_eq!(profile.missing_text, 1);
        assert_eq!(profile.missing_popularity, 1);
        assert_eq!(profile.missing_explicit, 2);
        assert_eq!(profile.year_range, Some((1985, 2015)));
        assert_eq!(profile.unbucketed, 1);
        assert_eq!(profile.genres.get("pop"), 2);
        assert_eq!(profile.buckets.get("2020s"), 0);
        assert_eq!(profile.buckets.labels().next(), Some("1990s"));
        assert_eq!(profile.explicit_share(), Some(50.0));
    }

    #[test]
    fn test_empty_profile() {
        let profile = CorpusProfile::from_documents(&[], &TimeBucket::decades());
        assert_eq!(profile.year_range, None);
        assert_eq!(profile.explicit_share(), None);
    }

    #[test]
    fn test_emotion_distribution() {
        let docs = sample();
        let all = emotion_distribution(&docs, None);
        assert_eq!(all.total(), 4);
        let pop = emotion_distribution(&docs, Some("pop"));
        assert_eq!(pop.get("joy"), 2);
        assert_eq!(pop.len(), 1);
    }

    #[test]
    fn test_popularity_by_genre() {
        let result = popularity_by_genre(&sample());
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].genre, "pop");
        assert_eq!(result[0].rated, 2);
        assert!((result[0].mean - 40.0).abs() < 1e-9);
        assert_eq!(result[1].genre, "hip hop");
    }
}
