//! 路由器服务
//!
//! 负责路由器的创建、由快照加载、查找、更新和端口地址分配。
//! 路由器对象本身保存在一个 [`Repository`] 中。

use tracing::{error, info, warn};

use crate::error::RouterError;
use crate::net::{Addr, Mask, PortNumber, RouterId};
use crate::router::{ContextFactory, NoContexts, Router, RouterConfig};

use super::repository::{InMemoryRepository, Repository};
use super::snapshot::RouterSnapshot;

type FactoryFn = Box<dyn Fn() -> Box<dyn ContextFactory> + Send>;

/// 为新建的路由器分配端口
#[derive(Debug, Clone, Copy)]
pub struct PortConfigurer {
    pub ports_per_router: u32,
}

impl Default for PortConfigurer {
    fn default() -> Self {
        Self { ports_per_router: 4 }
    }
}

impl PortConfigurer {
    pub fn give_ports_to(&self, router: &mut Router) {
        for _ in 0..self.ports_per_router {
            router.add_port();
        }
    }
}

pub struct RouterService<R = InMemoryRepository<RouterId, Router>> {
    repo: R,
    config: RouterConfig,
    configurer: PortConfigurer,
    make_factory: FactoryFn,
    next_id: u64,
}

impl Default for RouterService {
    fn default() -> Self {
        Self::new(InMemoryRepository::default(), RouterConfig::default())
    }
}

impl<R: Repository<RouterId, Router>> RouterService<R> {
    pub fn new(repo: R, config: RouterConfig) -> Self {
        let next_id = repo.keys().last().map_or(1, |id| id.0 + 1);
        Self {
            repo,
            config,
            configurer: PortConfigurer::default(),
            make_factory: Box::new(|| -> Box<dyn ContextFactory> { Box::new(NoContexts) }),
            next_id,
        }
    }

    pub fn with_configurer(mut self, configurer: PortConfigurer) -> Self {
        self.configurer = configurer;
        self
    }

    /// 设置新路由器使用的上下文工厂
    pub fn with_contexts<F>(mut self, make_factory: F) -> Self
    where
        F: Fn() -> Box<dyn ContextFactory> + Send + 'static,
    {
        self.make_factory = Box::new(make_factory);
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn ids(&self) -> Vec<RouterId> {
        self.repo.keys()
    }

    /// 新建路由器并按 [`PortConfigurer`] 分配端口，返回其 id。
    pub fn create(&mut self, name: impl Into<String>) -> RouterId {
        let id = RouterId(self.next_id);
        self.next_id += 1;

        let mut router = Router::new(id, name, self.config);
        router.set_factory((self.make_factory)());
        self.configurer.give_ports_to(&mut router);

        info!(router = %id, ports = router.ports().len(), "路由器已创建");
        self.repo.upsert(id, router);
        id
    }

    /// 由快照构建路由器、初始化工作路由并加入仓库。
    pub fn hydrate(&mut self, snapshot: &RouterSnapshot) -> Result<RouterId, RouterError> {
        if self.repo.contains(&snapshot.id) {
            error!(router = %snapshot.id, "重复的路由器 id");
            return Err(RouterError::ParameterInconsistency {
                what: "RouterSnapshot",
                detail: format!("duplicate router id {}", snapshot.id),
            });
        }
        let mut router = Router::from_snapshot(snapshot, self.config)?;
        router.set_factory((self.make_factory)());
        router.initialize_running_routes()?;

        let id = router.id();
        self.next_id = self.next_id.max(id.0 + 1);
        self.repo.upsert(id, router);
        Ok(id)
    }

    pub fn get(&self, id: RouterId) -> Option<&Router> {
        let router = self.repo.get(&id);
        if router.is_none() {
            warn!(router = %id, "仓库中找不到路由器");
        }
        router
    }

    pub fn get_mut(&mut self, id: RouterId) -> Option<&mut Router> {
        let router = self.repo.get_mut(&id);
        if router.is_none() {
            warn!(router = %id, "仓库中找不到路由器");
        }
        router
    }

    /// 保存路由器。未被跟踪的路由器会记录错误后照常加入仓库。
    pub fn update(&mut self, router: Router) -> RouterId {
        let id = router.id();
        if !self.repo.contains(&id) {
            error!(router = %id, "更新未被跟踪的路由器，重新登记");
        }
        self.next_id = self.next_id.max(id.0 + 1);
        self.repo.upsert(id, router);
        id
    }

    /// 为指定路由器的端口设置地址，并重新计算该端口的直连/本地路由。
    pub fn set_address(
        &mut self,
        router_id: RouterId,
        port: PortNumber,
        addr: Addr,
        mask: Mask,
    ) -> Result<(), RouterError> {
        let router = self
            .get_mut(router_id)
            .ok_or(RouterError::RouterNotFound(router_id))?;
        router.set_address(port, addr, mask)
    }
}
