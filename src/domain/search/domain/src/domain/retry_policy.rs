// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::time::Duration;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Retry schedule for transient search-engine failures. Non-transient
/// errors (mapping conflicts, malformed queries) are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub min_delay: Duration,
    pub backoff: RetryBackoffType,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            min_delay: Duration::from_secs(1),
            backoff: RetryBackoffType::ExponentialWithJitter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryBackoffType {
    Fixed,
    Linear,
    Exponential,
    ExponentialWithJitter,
}

impl RetryPolicy {
    /// Delay to wait before the given attempt (1-based; attempt 1 is the
    /// first retry after the initial failure)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = match self.backoff {
            RetryBackoffType::Fixed => self.min_delay,
            RetryBackoffType::Linear => self.min_delay * attempt,
            RetryBackoffType::Exponential | RetryBackoffType::ExponentialWithJitter => {
                self.min_delay * 2_u32.saturating_pow(attempt.saturating_sub(1))
            }
        };

        if self.backoff == RetryBackoffType::ExponentialWithJitter {
            // Uniform jitter in [0.5, 1.5) de-synchronizes worker retries
            use rand::Rng;
            let factor: f64 = rand::thread_rng().gen_range(0.5..1.5);
            base.mul_f64(factor)
        } else {
            base
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
