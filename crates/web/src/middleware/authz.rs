//! Declarative access policy for every routed operation.
//!
//! Handlers name the [`Operation`] they perform; [`Operation::policy`] is the
//! single table saying who may perform it and what a refused caller gets
//! instead.

use std::collections::BTreeSet;

use mysite_core::Permission;

use crate::models::User;

/// Every operation the site exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ShopIndex,
    ProductList,
    ProductDetail,
    ProductCreate,
    ProductUpdate,
    ProductArchive,
    ProductsExport,
    OrderList,
    OrderDetail,
    OrderCreate,
    OrdersExport,
    Register,
    Login,
    Logout,
    AboutMe,
    CookieSet,
    CookieGet,
    SessionSet,
    SessionGet,
}

/// What the caller must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Anyone,
    Authenticated,
    Permission(Permission),
    Staff,
    Superuser,
}

/// What a caller receives when the requirement is not met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    RedirectToLogin,
    Forbidden,
}

impl Refusal {
    const fn decision(self) -> Decision {
        match self {
            Self::RedirectToLogin => Decision::RedirectToLogin,
            Self::Forbidden => Decision::Forbidden,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub requirement: Requirement,
    /// Refusal for anonymous callers.
    pub anonymous: Refusal,
    /// Refusal for logged-in callers failing the requirement.
    pub denied: Refusal,
}

/// Outcome of checking a caller against a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    Forbidden,
}

impl Policy {
    const fn login_required(requirement: Requirement) -> Self {
        Self {
            requirement,
            anonymous: Refusal::RedirectToLogin,
            denied: Refusal::Forbidden,
        }
    }

    /// Every failing caller, logged in or not, is sent to the login page.
    const fn redirect_on_failure(requirement: Requirement) -> Self {
        Self {
            requirement,
            anonymous: Refusal::RedirectToLogin,
            denied: Refusal::RedirectToLogin,
        }
    }

    /// Check a caller; `None` is an anonymous visitor.
    #[must_use]
    pub fn decide(&self, caller: Option<(&User, &BTreeSet<Permission>)>) -> Decision {
        if self.requirement == Requirement::Anyone {
            return Decision::Allow;
        }

        let Some((user, granted)) = caller else {
            return self.anonymous.decision();
        };

        let allowed = match self.requirement {
            Requirement::Anyone | Requirement::Authenticated => true,
            Requirement::Permission(permission) => user.has_permission(granted, permission),
            Requirement::Staff => user.is_staff,
            Requirement::Superuser => user.is_superuser,
        };

        if allowed {
            Decision::Allow
        } else {
            self.denied.decision()
        }
    }
}

impl Operation {
    /// The access policy for this operation.
    #[must_use]
    pub const fn policy(self) -> Policy {
        match self {
            Self::ShopIndex
            | Self::ProductList
            | Self::ProductDetail
            | Self::ProductCreate
            | Self::ProductUpdate
            | Self::ProductArchive
            | Self::ProductsExport
            | Self::OrderCreate
            | Self::Register
            | Self::Login
            | Self::Logout
            | Self::AboutMe
            | Self::CookieGet => Policy::login_required(Requirement::Anyone),
            Self::OrderList | Self::SessionGet => {
                Policy::login_required(Requirement::Authenticated)
            }
            Self::OrderDetail => {
                Policy::login_required(Requirement::Permission(Permission::ViewOrder))
            }
            Self::OrdersExport => Policy::login_required(Requirement::Staff),
            Self::CookieSet => Policy::redirect_on_failure(Requirement::Superuser),
            Self::SessionSet => Policy {
                requirement: Requirement::Permission(Permission::ViewProfile),
                anonymous: Refusal::Forbidden,
                denied: Refusal::Forbidden,
            },
        }
    }
}
