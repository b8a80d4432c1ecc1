//! Query surface consumed by the presentation layer.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cache::{Cached, TtlCache};
use crate::config::{Config, SourceKind};
use crate::correlation::load_correlation;
use crate::error::{QueryError, QueryResult};
use crate::rank_response::{fetch_metadata, regulator_rank_response};
use crate::schema::v1::{CorrelationMatrixPayload, MetadataPayload, RegulatorRankResponse};
use crate::upstream::{ExportQuery, HttpUpstream, Upstream};

pub struct Explorer {
    config: Config,
    upstream: Arc<dyn Upstream>,
    correlations: TtlCache<SourceKind, CorrelationMatrixPayload, QueryError>,
    metadata: TtlCache<(), MetadataPayload, QueryError>,
    regulators: TtlCache<i64, RegulatorRankResponse, QueryError>,
}

impl Explorer {
    pub fn new(config: Config, upstream: Arc<dyn Upstream>) -> Self {
        let ttl = config.cache_ttl;
        Self {
            config,
            upstream,
            // Correlation snapshots only change on restart or explicit refresh.
            correlations: TtlCache::new(Duration::MAX),
            metadata: TtlCache::new(ttl),
            regulators: TtlCache::new(ttl),
        }
    }

    pub fn from_config(config: Config) -> QueryResult<Self> {
        let upstream = HttpUpstream::new(config.clone())?;
        Ok(Self::new(config, Arc::new(upstream)))
    }

    pub async fn correlation_matrix(
        &self,
        kind: SourceKind,
        refresh: bool,
    ) -> QueryResult<Cached<CorrelationMatrixPayload>> {
        let source = self.config.correlation_source(kind);
        let upstream = self.upstream.as_ref();
        let cached = self
            .correlations
            .compute_if_absent(kind, refresh, || async move {
                load_correlation(&source, Some(upstream)).await
            })
            .await?;
        info!(
            source = kind.as_str(),
            provenance = cached.provenance.as_str(),
            "correlation matrix served"
        );
        Ok(cached)
    }

    pub async fn rank_response_metadata(&self, refresh: bool) -> QueryResult<Cached<MetadataPayload>> {
        let query = ExportQuery::from_config(&self.config, None);
        let upstream = self.upstream.as_ref();
        let cached = self
            .metadata
            .compute_if_absent((), refresh, || async move {
                fetch_metadata(upstream, &query).await
            })
            .await?;
        info!(
            rows = cached.value.metadata.len(),
            provenance = cached.provenance.as_str(),
            "rank response metadata served"
        );
        Ok(cached)
    }

    pub async fn regulator_rank_response(
        &self,
        regulator_id: i64,
        refresh: bool,
    ) -> QueryResult<Cached<RegulatorRankResponse>> {
        let upstream = self.upstream.as_ref();
        let config = &self.config;
        let cached = self
            .regulators
            .compute_if_absent(regulator_id, refresh, || async move {
                regulator_rank_response(upstream, config, regulator_id).await
            })
            .await?;
        info!(
            regulator_id,
            provenance = cached.provenance.as_str(),
            "regulator rank response served"
        );
        Ok(cached)
    }

    pub fn invalidate_correlation(&self, kind: SourceKind) -> bool {
        self.correlations.invalidate(&kind)
    }

    pub fn invalidate_metadata(&self) -> bool {
        self.metadata.invalidate(&())
    }

    pub fn invalidate_regulator(&self, regulator_id: i64) -> bool {
        self.regulators.invalidate(&regulator_id)
    }
}
