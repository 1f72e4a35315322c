// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::future::Future;

use catalog_search::RetryPolicy;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Re-runs `op` on transient failures per the policy's backoff schedule.
/// Non-transient errors surface immediately, as does the last transient
/// error once attempts are exhausted.
pub async fn run_with_retry<T, E, Fut>(
    policy: RetryPolicy,
    is_transient: impl Fn(&E) -> bool,
    mut op: impl FnMut() -> Fut,
) -> Result<T, E>
where
    E: std::fmt::Display,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if is_transient(&e) && attempt + 1 < policy.max_attempts => {
                attempt += 1;
                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    error_msg = %e,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Transient search backend failure, retrying",
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
