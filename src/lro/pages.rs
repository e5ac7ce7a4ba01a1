//! Lazily fetched result pages of a finished job.

use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::stream::{self, Stream};

use super::{ContinuationToken, JobId, JobKind, PageRequest};
use crate::error::TextAnalyticsError;
use crate::service::AnalysisService;

/// One page of results and the token for the page after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub value: T,
    pub continuation_token: Option<ContinuationToken>,
}

/// Pages of a job's results, one request per page, fetched on demand.
pub struct PagedResults<K: JobKind> {
    service: Arc<dyn AnalysisService>,
    job_id: JobId,
    next: Option<PageRequest>,
    span: tracing::Span,
    fetched: u32,
    _kind: PhantomData<K>,
}

impl<K: JobKind> std::fmt::Debug for PagedResults<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedResults")
            .field("job_type", &K::JOB_TYPE)
            .field("job_id", &self.job_id)
            .field("next", &self.next)
            .field("fetched", &self.fetched)
            .finish()
    }
}

impl<K: JobKind> PagedResults<K> {
    pub(crate) fn new(
        service: Arc<dyn AnalysisService>,
        job_id: JobId,
        first: PageRequest,
        span: tracing::Span,
    ) -> Self {
        Self {
            service,
            job_id,
            next: Some(first),
            span,
            fetched: 0,
            _kind: PhantomData,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// True once the service has reported no further pages.
    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }

    /// Fetch the next page, or `None` past the last one. On error the
    /// position is unchanged and the call can be repeated.
    pub async fn next_page(&mut self) -> Result<Option<Page<K::Page>>, TextAnalyticsError> {
        let Some(request) = self.next else {
            return Ok(None);
        };
        let state = self.service.job_state(K::JOB_TYPE, self.job_id, request).await?;
        let continuation_token = ContinuationToken::from_next_link(state.next_link.as_deref())?;
        let value = self.span.in_scope(|| K::decode_page(&state))?;
        self.fetched += 1;
        self.next = continuation_token.map(PageRequest::from);

        self.span.in_scope(|| {
            tracing::debug!(
                job_id = %self.job_id,
                page = self.fetched,
                skip = request.skip,
                more = continuation_token.is_some(),
                "Fetched result page"
            );
        });

        Ok(Some(Page {
            value,
            continuation_token,
        }))
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<Page<K::Page>, TextAnalyticsError>> + Send {
        stream::try_unfold(self, |mut pages| async move {
            let page = pages.next_page().await?;
            Ok::<_, TextAnalyticsError>(page.map(|page| (page, pages)))
        })
    }

    /// Fetch every remaining page and merge them into one.
    pub async fn collect_all(mut self) -> Result<K::Page, TextAnalyticsError> {
        let mut all = K::Page::default();
        while let Some(page) = self.next_page().await? {
            K::merge(&mut all, page.value);
        }
        Ok(all)
    }
}
