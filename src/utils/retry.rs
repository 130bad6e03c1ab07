use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use crate::core::DevHookError;

/// 重试策略
#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// 指数退避
    Exponential {
        initial: Duration,
        multiplier: f64,
        max_delay: Duration,
    },
}

impl RetryStrategy {
    /// 计算第 n 次重试的延迟，结果落在 [0, max_delay] 内
    pub fn get_delay(&self, attempt: u32) -> Duration {
        match self {
            RetryStrategy::Exponential { initial, multiplier, max_delay } => {
                let delay = initial.as_secs_f64() * multiplier.powf(attempt as f64);
                if delay.is_nan() || delay >= max_delay.as_secs_f64() {
                    return *max_delay;
                }
                Duration::try_from_secs_f64(delay.max(0.0)).unwrap_or(*max_delay)
            }
        }
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        RetryStrategy::Exponential {
            initial: Duration::from_millis(10),
            multiplier: 4.0,
            max_delay: Duration::from_secs(60),
        }
    }
}

/// 重试配置
pub struct RetryConfig<E = DevHookError> {
    /// 最大尝试次数，None 表示只受总时长限制
    pub max_attempts: Option<u32>,
    /// 总时长上限，下一次等待会超出时放弃
    pub max_elapsed: Option<Duration>,
    /// 重试策略
    pub strategy: RetryStrategy,
    /// 是否重试的判断函数
    pub should_retry: Box<dyn Fn(&E) -> bool + Send + Sync>,
    /// 重试次数用尽时产生的错误
    pub on_exhausted: Box<dyn Fn(u32, E) -> E + Send + Sync>,
}

impl Default for RetryConfig<DevHookError> {
    fn default() -> Self {
        Self {
            max_attempts: None,
            max_elapsed: Some(Duration::from_secs(60)),
            strategy: RetryStrategy::default(),
            should_retry: Box::new(DevHookError::is_retryable),
            on_exhausted: Box::new(|attempts: u32, _: DevHookError| DevHookError::RetryLimitExceeded { attempts }),
        }
    }
}

/// 执行带重试的操作
pub async fn retry_with_config<F, Fut, T, E>(
    config: RetryConfig<E>,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let started = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        let error = match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => error,
        };
        attempt += 1;

        // 检查是否应该重试
        if !(config.should_retry)(&error) {
            return Err(error);
        }

        if config.max_attempts.is_some_and(|max| attempt >= max) {
            return Err((config.on_exhausted)(attempt, error));
        }

        let delay = config.strategy.get_delay(attempt - 1);
        if let Some(max_elapsed) = config.max_elapsed {
            if started.elapsed() + delay > max_elapsed {
                return Err((config.on_exhausted)(attempt, error));
            }
        }

        tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying after backoff");
        sleep(delay).await;
    }
}

/// 重试构建器
pub struct RetryBuilder<E = DevHookError> {
    config: RetryConfig<E>,
}

impl RetryBuilder<DevHookError> {
    pub fn new() -> Self {
        Self {
            config: RetryConfig::default(),
        }
    }
}

impl Default for RetryBuilder<DevHookError> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> RetryBuilder<E> {
    pub fn max_attempts(mut self, attempts: Option<u32>) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn max_elapsed(mut self, max_elapsed: Option<Duration>) -> Self {
        self.config.max_elapsed = max_elapsed;
        self
    }

    pub fn strategy(mut self, strategy: RetryStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn should_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.config.should_retry = Box::new(f);
        self
    }

    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(u32, E) -> E + Send + Sync + 'static,
    {
        self.config.on_exhausted = Box::new(f);
        self
    }

    pub async fn run<F, Fut, T>(self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        retry_with_config(self.config, operation).await
    }
}
