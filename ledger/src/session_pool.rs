use crate::gateway::{Contract, Session, SessionFactory};
use crate::ledger_error::LedgerError;
use slog::{Logger, debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type IdleSessions = HashMap<String, Vec<Arc<dyn Session>>>;

struct PoolInner {
    idle: Mutex<IdleSessions>,
    max_idle_per_identity: usize,
    log: Logger,
}

impl PoolInner {
    // 锁中毒时继续使用内部数据, 池中只有会话句柄
    fn idle(&self) -> MutexGuard<'_, IdleSessions> {
        self.idle.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn release(&self, session: Arc<dyn Session>, broken: bool) {
        if broken || session.is_closed() {
            session.close();
            debug!(self.log, "Session discarded"; "identity" => session.identity_label());
            return;
        }
        let mut idle = self.idle();
        let list = idle
            .entry(session.identity_label().to_string())
            .or_default();
        if list.len() < self.max_idle_per_identity {
            list.push(session);
        } else {
            session.close();
        }
    }
}

/// 按身份标签缓存网关会话; 租约在任何退出路径上都会归还或关闭会话
#[derive(Clone)]
pub struct SessionPool {
    factory: Arc<dyn SessionFactory>,
    inner: Arc<PoolInner>,
}

impl SessionPool {
    pub fn new(factory: Arc<dyn SessionFactory>, max_idle_per_identity: usize, log: Logger) -> Self {
        SessionPool {
            factory,
            inner: Arc::new(PoolInner {
                idle: Mutex::new(HashMap::new()),
                max_idle_per_identity,
                log,
            }),
        }
    }

    fn take_idle(&self, identity_label: &str) -> Option<Arc<dyn Session>> {
        let mut idle = self.inner.idle();
        let list = idle.get_mut(identity_label)?;
        while let Some(session) = list.pop() {
            if !session.is_closed() {
                return Some(session);
            }
        }
        None
    }

    pub async fn acquire(&self, identity_label: &str) -> Result<SessionLease, LedgerError> {
        let session = match self.take_idle(identity_label) {
            Some(session) => session,
            None => self.factory.open_session(identity_label).await?,
        };
        Ok(SessionLease {
            session,
            pool: self.inner.clone(),
            broken: false,
        })
    }

    pub fn idle_count(&self, identity_label: &str) -> usize {
        self.inner
            .idle()
            .get(identity_label)
            .map_or(0, |list| list.len())
    }

    /// 关闭所有空闲会话 (进程退出时调用)
    pub fn close_all(&self) {
        let drained: Vec<Arc<dyn Session>> = self
            .inner
            .idle()
            .drain()
            .flat_map(|(_, list)| list)
            .collect();
        let count = drained.len();
        for session in drained {
            session.close();
        }
        info!(self.inner.log, "Closed idle gateway sessions"; "count" => count);
    }
}

pub struct SessionLease {
    session: Arc<dyn Session>,
    pool: Arc<PoolInner>,
    broken: bool,
}

impl SessionLease {
    pub fn identity_label(&self) -> &str {
        self.session.identity_label()
    }

    pub fn contract(&self, channel: &str, chaincode: &str) -> Arc<dyn Contract> {
        self.session.contract(channel, chaincode)
    }

    /// 标记会话不可复用, 归还时直接关闭
    pub fn discard(&mut self) {
        self.broken = true;
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        self.pool.release(self.session.clone(), self.broken);
    }
}
