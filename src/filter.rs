// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use serde::Serialize;

use crate::catalog::Catalog;
use crate::model::{Channel, Stream};

/// Decides whether a stream can be offered by the caller's player.
pub type PlayablePredicate = fn(&Stream) -> bool;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub text: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub browser_playable_only: bool,
}

impl FilterSpec {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn browser_playable_only(mut self, enabled: bool) -> Self {
        self.browser_playable_only = enabled;
        self
    }

    fn text_needle(&self) -> Option<String> {
        non_blank(&self.text).map(str::to_lowercase)
    }

    fn matches_channel(&self, channel: &Channel, needle: Option<&str>) -> bool {
        if let Some(country) = non_blank(&self.country)
            && channel.country.as_deref() != Some(country)
        {
            return false;
        }

        if let Some(category) = non_blank(&self.category)
            && !channel.categories.iter().any(|c| c == category)
        {
            return false;
        }

        if let Some(needle) = needle
            && !channel.name.to_lowercase().contains(needle)
            && !channel.id.to_lowercase().contains(needle)
        {
            return false;
        }

        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// One row of a listing: a channel and the streams that passed the filter.
#[derive(Debug, Clone, Serialize)]
pub struct Listing<'a> {
    pub channel: &'a Channel,
    pub streams: Vec<&'a Stream>,
}

pub fn filter_and_sort<'a>(catalog: &'a Catalog, spec: &FilterSpec) -> Vec<Listing<'a>> {
    filter_and_sort_with(catalog, spec, Stream::is_browser_playable)
}

/// Filters the catalog and sorts by case-insensitive name, ties broken by id.
/// Channels left without any stream are never listed.
pub fn filter_and_sort_with<'a>(
    catalog: &'a Catalog,
    spec: &FilterSpec,
    playable: PlayablePredicate,
) -> Vec<Listing<'a>> {
    let needle = spec.text_needle();

    let mut items: Vec<Listing<'a>> = catalog
        .streams_by_channel
        .iter()
        .filter_map(|(id, streams)| {
            let channel = catalog.channels_by_id.get(id)?;
            if !spec.matches_channel(channel, needle.as_deref()) {
                return None;
            }

            let streams: Vec<&Stream> = streams
                .iter()
                .filter(|s| !spec.browser_playable_only || playable(s))
                .collect();
            if streams.is_empty() {
                return None;
            }

            Some(Listing { channel, streams })
        })
        .collect();

    items.sort_by_cached_key(|l| (l.channel.name.to_lowercase(), l.channel.id.clone()));

    items
}
