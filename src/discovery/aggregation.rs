//! Traffic statistics keyed by endpoint pattern.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::urltree::Method;

use super::AccessLog;

/// Method and normalized URL pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    pub method: Method,
    pub url: String,
}

impl Endpoint {
    pub fn new(method: impl Into<Method>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Client library that reported the traffic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interceptor {
    pub kind: String,
    pub version: String,
}

impl Interceptor {
    /// Parse `type/version`; a missing version is empty.
    pub fn parse(raw: &str) -> Self {
        let (kind, version) = raw.split_once('/').unwrap_or((raw, ""));
        Self {
            kind: kind.to_string(),
            version: version.to_string(),
        }
    }
}

impl fmt::Display for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointAgg {
    pub min_time: i64,
    pub max_time: i64,
    pub count: u64,
    pub status_codes: BTreeMap<u16, u64>,
    /// Milliseconds.
    pub average_duration: f64,
}

impl EndpointAgg {
    pub fn from_record(record: &AccessLog) -> Self {
        Self {
            min_time: record.timestamp,
            max_time: record.timestamp,
            count: 1,
            status_codes: BTreeMap::from([(record.status_code, 1)]),
            average_duration: record.duration as f64,
        }
    }

    /// Fold `other` in; the average is weighted by count.
    pub fn combine(&mut self, other: &EndpointAgg) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let total = self.count + other.count;
        self.average_duration = (self.average_duration * self.count as f64
            + other.average_duration * other.count as f64)
            / total as f64;
        self.count = total;
        self.min_time = self.min_time.min(other.min_time);
        self.max_time = self.max_time.max(other.max_time);
        for (status, count) in &other.status_codes {
            *self.status_codes.entry(*status).or_default() += count;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterceptorAgg {
    /// Most recent report, epoch milliseconds.
    pub timestamp: i64,
}

/// Aggregated state of one or more access log batches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub endpoints: BTreeMap<Endpoint, EndpointAgg>,
    pub consumers: BTreeMap<String, BTreeMap<Endpoint, EndpointAgg>>,
    pub interceptors: BTreeMap<Interceptor, InterceptorAgg>,
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty() && self.interceptors.is_empty()
    }

    /// Account one record under the resolved `endpoint`.
    pub fn record(&mut self, endpoint: Endpoint, record: &AccessLog) {
        let agg = EndpointAgg::from_record(record);
        if let Some(consumer) = &record.consumer_tag {
            combine_into(
                self.consumers.entry(consumer.clone()).or_default(),
                endpoint.clone(),
                &agg,
            );
        }
        combine_into(&mut self.endpoints, endpoint, &agg);

        if let Some(raw) = &record.interceptor {
            let seen = self
                .interceptors
                .entry(Interceptor::parse(raw))
                .or_insert(InterceptorAgg {
                    timestamp: record.timestamp,
                });
            seen.timestamp = seen.timestamp.max(record.timestamp);
        }
    }

    pub fn combine(&mut self, other: &Aggregation) {
        for (endpoint, agg) in &other.endpoints {
            combine_into(&mut self.endpoints, endpoint.clone(), agg);
        }
        for (consumer, endpoints) in &other.consumers {
            let mine = self.consumers.entry(consumer.clone()).or_default();
            for (endpoint, agg) in endpoints {
                combine_into(mine, endpoint.clone(), agg);
            }
        }
        for (interceptor, agg) in &other.interceptors {
            let seen = self.interceptors.entry(interceptor.clone()).or_insert(*agg);
            seen.timestamp = seen.timestamp.max(agg.timestamp);
        }
    }

    /// Rewrite every endpoint key through `resolve`, merging keys that
    /// collapse onto the same pattern.
    pub fn rekey<F>(&mut self, mut resolve: F)
    where
        F: FnMut(&Endpoint) -> Endpoint,
    {
        self.endpoints = rekey_map(std::mem::take(&mut self.endpoints), &mut resolve);
        for endpoints in self.consumers.values_mut() {
            *endpoints = rekey_map(std::mem::take(endpoints), &mut resolve);
        }
    }

    /// JSON-friendly view keyed by `METHOD url`.
    pub fn report(&self) -> DiscoveryReport {
        DiscoveryReport {
            endpoints: stringify_keys(&self.endpoints),
            consumers: self
                .consumers
                .iter()
                .map(|(consumer, endpoints)| (consumer.clone(), stringify_keys(endpoints)))
                .collect(),
            interceptors: self
                .interceptors
                .iter()
                .map(|(interceptor, agg)| (interceptor.to_string(), *agg))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryReport {
    pub endpoints: BTreeMap<String, EndpointAgg>,
    pub consumers: BTreeMap<String, BTreeMap<String, EndpointAgg>>,
    pub interceptors: BTreeMap<String, InterceptorAgg>,
}

fn combine_into(map: &mut BTreeMap<Endpoint, EndpointAgg>, endpoint: Endpoint, agg: &EndpointAgg) {
    match map.get_mut(&endpoint) {
        Some(existing) => existing.combine(agg),
        None => {
            map.insert(endpoint, agg.clone());
        }
    }
}

fn rekey_map<F>(map: BTreeMap<Endpoint, EndpointAgg>, resolve: &mut F) -> BTreeMap<Endpoint, EndpointAgg>
where
    F: FnMut(&Endpoint) -> Endpoint,
{
    let mut rekeyed = BTreeMap::new();
    for (endpoint, agg) in map {
        combine_into(&mut rekeyed, resolve(&endpoint), &agg);
    }
    rekeyed
}

fn stringify_keys(map: &BTreeMap<Endpoint, EndpointAgg>) -> BTreeMap<String, EndpointAgg> {
    map.iter()
        .map(|(endpoint, agg)| (endpoint.to_string(), agg.clone()))
        .collect()
}
