//! The classifier store.
//!
//! The population owns every classifier. Match sets and action sets only hold
//! [`ClassifierId`]s pointing into it. Identifiers increase monotonically and
//! are never reused, so an identifier held across a deletion simply stops
//! resolving instead of aliasing a newer classifier. Iteration follows
//! insertion order.
//!
//! Two sizes matter:
//!
//! - the *macro* size ([`Population::len`]) counts stored records and is unbounded;
//! - the *micro* size ([`Population::micro_size`]) sums numerosities and is kept
//!   at or below `max_pop` by [`Population::enforce_cap`], which callers run
//!   after every insertion.

use std::collections::BTreeMap;

use rand::Rng;

use crate::{Classifier, XcsConfig, XcsError, roulette};

/// Stable handle to a classifier record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassifierId(u64);

/// Result of a deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Deletion {
    /// One copy was removed; the record survives.
    Decremented(ClassifierId),
    /// The record held the last copy and was dropped.
    Removed(ClassifierId),
}

#[derive(Debug, Clone, Default)]
pub struct Population {
    classifiers: BTreeMap<ClassifierId, Classifier>,
    next_id: u64,
}

impl FromIterator<Classifier> for Population {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Classifier>,
    {
        let mut population = Self::new();
        for classifier in iter {
            population.insert(classifier);
        }
        population
    }
}

impl Population {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records (macro-classifiers).
    #[must_use]
    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }

    /// Sum of numerosities (micro-classifiers).
    #[must_use]
    pub fn micro_size(&self) -> u64 {
        self.classifiers
            .values()
            .map(|cl| u64::from(cl.numerosity()))
            .sum()
    }

    /// Condition length shared by the stored classifiers, if any are stored.
    #[must_use]
    pub fn condition_len(&self) -> Option<usize> {
        self.classifiers.values().next().map(|cl| cl.condition().len())
    }

    #[must_use]
    pub fn get(&self, id: ClassifierId) -> Option<&Classifier> {
        self.classifiers.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: ClassifierId) -> bool {
        self.classifiers.contains_key(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ClassifierId) -> Option<&mut Classifier> {
        self.classifiers.get_mut(&id)
    }

    /// Iterates over records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ClassifierId, &Classifier)> + '_ {
        self.classifiers.iter().map(|(id, cl)| (*id, cl))
    }

    pub fn classifiers(&self) -> impl Iterator<Item = &Classifier> + '_ {
        self.classifiers.values()
    }

    /// Adds a classifier, merging it into an existing record with the same
    /// condition and action.
    ///
    /// On a merge only the existing record's numerosity changes (by the
    /// inserted classifier's numerosity); its statistics are kept and the
    /// new record is discarded. Returns the identifier of the record that now
    /// holds the classifier.
    pub fn insert(&mut self, classifier: Classifier) -> ClassifierId {
        if let Some((id, existing)) = self
            .classifiers
            .iter_mut()
            .find(|(_, cl)| cl.is_same_rule(&classifier))
        {
            existing.add_numerosity(classifier.numerosity());
            return *id;
        }
        let id = ClassifierId(self.next_id);
        self.next_id += 1;
        self.classifiers.insert(id, classifier);
        id
    }

    pub(crate) fn remove(&mut self, id: ClassifierId) -> Option<Classifier> {
        self.classifiers.remove(&id)
    }

    /// Mean fitness per micro-classifier (`Σ fitness / micro size`).
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_fitness(&self) -> f64 {
        let micro_size = self.micro_size();
        if micro_size == 0 {
            return 0.0;
        }
        self.classifiers.values().map(Classifier::fitness).sum::<f64>() / micro_size as f64
    }

    /// Deletes one micro-classifier if the population exceeds `max_pop`.
    ///
    /// The victim is chosen by roulette over
    /// [`Classifier::deletion_vote`]. Returns `None` when the population is
    /// at or below the cap.
    pub fn enforce_cap<R>(
        &mut self,
        config: &XcsConfig,
        rng: &mut R,
    ) -> Result<Option<Deletion>, XcsError>
    where
        R: Rng + ?Sized,
    {
        if self.micro_size() <= config.max_pop {
            return Ok(None);
        }
        let mean_fitness = self.mean_fitness();
        let (ids, votes): (Vec<_>, Vec<_>) = self
            .iter()
            .map(|(id, cl)| (id, cl.deletion_vote(mean_fitness, config)))
            .unzip();
        let index = roulette::select(&votes, rng).ok_or(XcsError::EmptySelection {
            context: "population deletion",
        })?;
        let id = ids[index];

        let decremented = self
            .classifiers
            .get_mut(&id)
            .is_some_and(Classifier::remove_copy);
        let deletion = if decremented {
            Deletion::Decremented(id)
        } else {
            self.classifiers.remove(&id);
            Deletion::Removed(id)
        };
        log::trace!("deleted from population: {deletion:?}");
        Ok(Some(deletion))
    }
}
