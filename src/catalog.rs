// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::model::{Channel, Snapshot, Stream};

/// Cross-referenced view of one snapshot: every key of `streams_by_channel`
/// is also a key of `channels_by_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub channels_by_id: HashMap<String, Channel>,
    pub streams_by_channel: HashMap<String, Vec<Stream>>,
}

impl Catalog {
    /// Joins the raw snapshot records. On duplicate channel ids the last record wins.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut channels_by_id = HashMap::with_capacity(snapshot.channels.len());
        let mut malformed_channels = 0usize;

        for raw in &snapshot.channels {
            match Channel::from_raw(raw) {
                Some(channel) => {
                    channels_by_id.insert(channel.id.clone(), channel);
                }
                None => malformed_channels += 1,
            }
        }

        let mut streams_by_channel: HashMap<String, Vec<Stream>> = HashMap::new();
        let mut malformed_streams = 0usize;
        let mut orphans = 0usize;

        for raw in &snapshot.streams {
            let Some(stream) = Stream::from_raw(raw) else {
                malformed_streams += 1;
                continue;
            };

            if !channels_by_id.contains_key(&stream.channel) {
                orphans += 1;
                continue;
            }

            streams_by_channel
                .entry(stream.channel.clone())
                .or_default()
                .push(stream);
        }

        debug!(
            "Joined {} channels and {} stream groups (dropped {} malformed channels, {} malformed streams, {} orphans)",
            channels_by_id.len(),
            streams_by_channel.len(),
            malformed_channels,
            malformed_streams,
            orphans
        );

        Self {
            channels_by_id,
            streams_by_channel,
        }
    }

    pub fn into_parts(self) -> (HashMap<String, Channel>, HashMap<String, Vec<Stream>>) {
        (self.channels_by_id, self.streams_by_channel)
    }

    pub fn is_empty(&self) -> bool {
        self.channels_by_id.is_empty()
    }

    pub fn channel(&self, id: &str) -> Option<&Channel> {
        self.channels_by_id.get(id)
    }

    pub fn streams(&self, channel_id: &str) -> &[Stream] {
        self.streams_by_channel
            .get(channel_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn stream(&self, channel_id: &str, index: usize) -> Option<&Stream> {
        self.streams(channel_id).get(index)
    }

    /// A channel is listable when at least one stream survived the join.
    pub fn is_listable(&self, channel_id: &str) -> bool {
        !self.streams(channel_id).is_empty()
    }

    pub fn countries(&self) -> Vec<String> {
        self.channels_by_id
            .values()
            .filter_map(|c| c.country.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn categories(&self) -> Vec<String> {
        self.channels_by_id
            .values()
            .flat_map(|c| c.categories.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
