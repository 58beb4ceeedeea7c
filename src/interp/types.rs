//! Runtime type descriptions and generic matching
//!
//! Types are nominal: a constructor plus type arguments. `Seq` and `Var`
//! appear only in declared signatures; `Any` stands for an element type that
//! could not be pinned down (empty or mixed containers). Extension
//! applicability is decided by [`unify`] plus per-parameter [`satisfies`]
//! checks — constraint violation is a boolean outcome, never an error path.

use std::collections::HashMap;
use std::fmt;

/// Runtime or signature type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ty {
    Nil,
    Bool,
    Int,
    Float,
    Str,
    Range,
    Func,
    List(Box<Ty>),
    Map(Box<Ty>, Box<Ty>),
    /// Abstract sequence of elements (signature position only)
    Seq(Box<Ty>),
    /// Named type parameter (signature position only)
    Var(&'static str),
    /// Unknown element type
    Any,
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Nil => write!(f, "Nil"),
            Ty::Bool => write!(f, "Bool"),
            Ty::Int => write!(f, "Int"),
            Ty::Float => write!(f, "Float"),
            Ty::Str => write!(f, "Str"),
            Ty::Range => write!(f, "Range"),
            Ty::Func => write!(f, "Func"),
            Ty::List(el) => write!(f, "List[{}]", el),
            Ty::Map(k, v) => write!(f, "Map[{}, {}]", k, v),
            Ty::Seq(el) => write!(f, "Seq[{}]", el),
            Ty::Var(name) => write!(f, "{}", name),
            Ty::Any => write!(f, "Any"),
        }
    }
}

/// Interfaces implemented by concrete types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iface {
    Countable,
    Ordered,
    Equatable,
    Numeric,
}

impl fmt::Display for Iface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Iface::Countable => write!(f, "Countable"),
            Iface::Ordered => write!(f, "Ordered"),
            Iface::Equatable => write!(f, "Equatable"),
            Iface::Numeric => write!(f, "Numeric"),
        }
    }
}

/// Constraint on a declared type parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Implements(Iface),
    /// Only container types (lists and maps) qualify
    Container,
}

/// Substitution from type-parameter names to concrete types
pub type Subst = HashMap<&'static str, Ty>;

/// Does `ty` implement `iface`?
pub fn implements(ty: &Ty, iface: Iface) -> bool {
    match iface {
        Iface::Countable => matches!(ty, Ty::Str | Ty::List(_) | Ty::Map(..) | Ty::Range),
        Iface::Ordered => matches!(ty, Ty::Int | Ty::Float | Ty::Str),
        Iface::Equatable => matches!(ty, Ty::Int | Ty::Float | Ty::Str | Ty::Bool),
        Iface::Numeric => matches!(ty, Ty::Int | Ty::Float),
    }
}

/// Container/scalar category split
pub fn is_container(ty: &Ty) -> bool {
    matches!(ty, Ty::List(_) | Ty::Map(..))
}

/// Element type of the sequence view, for sequence-like types
pub fn seq_element(ty: &Ty) -> Option<Ty> {
    match ty {
        Ty::List(el) => Some((**el).clone()),
        Ty::Range => Some(Ty::Int),
        Ty::Str => Some(Ty::Str),
        _ => None,
    }
}

/// Structural match of a receiver type against a declared type.
///
/// Type parameters bind consistently into `subst`; a `Seq` requirement is
/// satisfied through the receiver's sequence view.
pub fn unify(recv: &Ty, decl: &Ty, subst: &mut Subst) -> bool {
    match decl {
        Ty::Any => true,
        Ty::Var(name) => match subst.get(name) {
            Some(bound) => bound == recv,
            None => {
                subst.insert(*name, recv.clone());
                true
            }
        },
        Ty::List(d) => match recv {
            Ty::List(r) => unify(r, d, subst),
            _ => false,
        },
        Ty::Map(dk, dv) => match recv {
            Ty::Map(rk, rv) => unify(rk, dk, subst) && unify(rv, dv, subst),
            _ => false,
        },
        Ty::Seq(d) => match seq_element(recv) {
            Some(el) => unify(&el, d, subst),
            None => false,
        },
        concrete => recv == concrete,
    }
}

/// Check one type parameter's constraints against its binding.
///
/// A parameter that carries constraints but never got bound cannot be
/// verified, so it fails the check.
pub fn satisfies(binding: Option<&Ty>, constraints: &[Constraint]) -> bool {
    if constraints.is_empty() {
        return true;
    }
    let Some(ty) = binding else {
        return false;
    };
    constraints.iter().all(|c| match c {
        Constraint::Implements(iface) => implements(ty, *iface),
        Constraint::Container => is_container(ty),
    })
}

/// Apply a substitution to a declared type, for signature rendering
pub fn apply(decl: &Ty, subst: &Subst) -> Ty {
    match decl {
        Ty::Var(name) => subst.get(name).cloned().unwrap_or(Ty::Any),
        Ty::List(d) => Ty::List(Box::new(apply(d, subst))),
        Ty::Map(k, v) => Ty::Map(Box::new(apply(k, subst)), Box::new(apply(v, subst))),
        Ty::Seq(d) => Ty::Seq(Box::new(apply(d, subst))),
        other => other.clone(),
    }
}
