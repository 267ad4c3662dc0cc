use super::{InboundFrame, SignalKey};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Logical value of every signal. All six are always populated and start
/// out `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SignalSet {
    values: [bool; SignalKey::COUNT],
}

impl SignalSet {
    pub fn get(&self, key: SignalKey) -> bool {
        self.values[key.index()]
    }

    pub fn with(mut self, key: SignalKey, value: bool) -> Self {
        self.values[key.index()] = value;
        self
    }

    /// All signals in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (SignalKey, bool)> + '_ {
        SignalKey::ALL
            .into_iter()
            .map(move |key| (key, self.get(key)))
    }

    /// Signals that are currently logically true, in canonical order
    pub fn active(&self) -> Vec<SignalKey> {
        self.iter()
            .filter_map(|(key, value)| value.then_some(key))
            .collect()
    }
}

impl Serialize for SignalSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(SignalKey::COUNT))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key.as_str(), &value)?;
        }
        map.end()
    }
}

/// Maps a frame onto logical signal values and reports which signals went
/// from inactive to active relative to `previous`.
///
/// Direct fields are copied verbatim; the two inverted fields are negated.
/// Transitions are reported in canonical key order. `previous` is left
/// untouched.
pub fn apply(previous: &SignalSet, frame: &InboundFrame) -> (SignalSet, Vec<SignalKey>) {
    let mut next = SignalSet::default();
    for key in SignalKey::ALL {
        let wire = frame.wire_value(key);
        next.values[key.index()] = if key.is_inverted() { !wire } else { wire };
    }

    let activated = SignalKey::ALL
        .into_iter()
        .filter(|&key| !previous.get(key) && next.get(key))
        .collect();

    (next, activated)
}

/// Owner of the authoritative signal state
#[derive(Debug, Default)]
pub struct SignalStore {
    current: SignalSet,
    last_timestamp: Option<DateTime<Utc>>,
}

impl SignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a validated frame; returns the signals that just became active
    pub fn ingest(&mut self, frame: &InboundFrame) -> Vec<SignalKey> {
        let (next, activated) = apply(&self.current, frame);
        self.current = next;
        self.last_timestamp = Some(frame.timestamp);
        activated
    }

    pub fn snapshot(&self) -> SignalSet {
        self.current
    }

    /// Controller timestamp of the last applied frame
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_timestamp
    }
}
