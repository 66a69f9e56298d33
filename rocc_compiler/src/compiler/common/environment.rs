//! The scope-tree storing declared variables and types

use std::cell::RefCell;
use std::rc::Rc;

/// A declarable type, pre-registered in the root scope
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub name: String,
    pub size: usize,
}
pub type TypeRef = Rc<Type>;

/// The information stored for a declared variable.
/// Shared between the scope-tree and the AST nodes referencing it, so that
/// codegen sees the same stack-slot the parser assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub name: String,
    pub ty: TypeRef,
    /// Offset from the frame-pointer of the slot holding this variable
    pub offset: usize,
    pub initialized: bool,
    pub defined: bool,
}
pub type VarRef = Rc<RefCell<Var>>;

/// Handle addressing a scope inside the [ScopeArena]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScopeId(usize);

/// Ordered declaration tables of a single scope, linked to its enclosing scope
#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    vars: Vec<VarRef>,
    types: Vec<TypeRef>,
}
impl Scope {
    fn new(parent: Option<ScopeId>) -> Self {
        Scope {
            parent,
            vars: Vec::new(),
            types: Vec::new(),
        }
    }
}

/// All scopes of a compilation, addressed by [ScopeId] so that the non-owning
/// parent back-references never require lifetime juggling.
/// Declarations go into the current scope, lookups walk outwards through the
/// parent links.
#[derive(Debug)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
    current: ScopeId,

    // single per-function slot allocator, reset when a new function begins
    frame_offset: usize,
}
impl ScopeArena {
    pub fn new() -> Self {
        let mut arena = ScopeArena {
            scopes: vec![Scope::new(None)],
            current: ScopeId(0),
            frame_offset: 0,
        };
        arena.declare_type("int", 4);
        arena.declare_type("char", 1);
        arena
    }

    pub fn enter(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(Some(self.current)));
        self.current = id;
        id
    }
    pub fn exit(&mut self) {
        self.current = self.scopes[self.current.0]
            .parent
            .expect("cannot exit the root scope");
    }

    /// Starts a fresh stack-frame, so following declarations get offsets
    /// starting over at the frame-pointer
    pub fn begin_frame(&mut self) {
        self.frame_offset = 0;
    }
    /// Bytes occupied by all slots handed out since [begin_frame](ScopeArena::begin_frame)
    pub fn frame_size(&self) -> usize {
        self.frame_offset
    }

    /// Declares a variable in the current scope, assigning it the next free
    /// stack-slot of the enclosing function. Returns the new variable and
    /// wether it shadows a declaration in the same scope (the caller warns,
    /// the later declaration wins on lookup).
    pub fn declare_var(&mut self, name: &str, ty: TypeRef, initialized: bool) -> (VarRef, bool) {
        let redeclared = self.scopes[self.current.0]
            .vars
            .iter()
            .any(|var| var.borrow().name == name);

        // every slot is addressed with 32-bit moves, so round up to 4 bytes
        self.frame_offset = align_by(self.frame_offset + ty.size, 4);

        let var = Rc::new(RefCell::new(Var {
            name: name.to_string(),
            ty,
            offset: self.frame_offset,
            initialized,
            defined: true,
        }));
        self.scopes[self.current.0].vars.push(Rc::clone(&var));

        (var, redeclared)
    }

    pub fn get_var(&self, name: &str) -> Option<VarRef> {
        let mut scope = Some(self.current);
        while let Some(id) = scope {
            // reverse order so a redeclaration shadows its predecessor
            if let Some(var) = self.scopes[id.0]
                .vars
                .iter()
                .rev()
                .find(|var| var.borrow().name == name)
            {
                return Some(Rc::clone(var));
            }
            scope = self.scopes[id.0].parent;
        }
        None
    }
    pub fn get_type(&self, name: &str) -> Option<TypeRef> {
        let mut scope = Some(self.current);
        while let Some(id) = scope {
            if let Some(ty) = self.scopes[id.0].types.iter().find(|ty| ty.name == name) {
                return Some(Rc::clone(ty));
            }
            scope = self.scopes[id.0].parent;
        }
        None
    }

    fn declare_type(&mut self, name: &str, size: usize) {
        self.scopes[self.current.0].types.push(Rc::new(Type {
            name: name.to_string(),
            size,
        }));
    }
}

pub fn align_by(offset: usize, alignment: usize) -> usize {
    (offset + alignment - 1) / alignment * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(arena: &ScopeArena) -> TypeRef {
        arena.get_type("int").unwrap()
    }

    #[test]
    fn builtin_types_in_root_scope() {
        let mut arena = ScopeArena::new();

        assert_eq!(arena.get_type("int").unwrap().size, 4);
        assert_eq!(arena.get_type("char").unwrap().size, 1);
        assert!(arena.get_type("long").is_none());

        // still visible from nested scopes
        arena.enter();
        arena.enter();
        assert!(arena.get_type("char").is_some());
    }

    #[test]
    fn builds_scope_tree() {
        // int main() {
        //     int s;
        //     {
        //         int n;
        //     }
        //     int n;
        // }
        let mut arena = ScopeArena::new();

        arena.enter();
        arena.declare_var("s", int(&arena), false);
        assert!(arena.get_var("s").is_some());

        arena.enter();
        arena.declare_var("n", int(&arena), false);
        assert!(arena.get_var("n").is_some());
        assert!(arena.get_var("s").is_some());
        arena.exit();

        // inner declaration no longer reachable
        assert!(arena.get_var("n").is_none());

        arena.declare_var("n", int(&arena), false);
        assert!(arena.get_var("n").is_some());

        arena.exit();
        assert!(arena.get_var("s").is_none());
    }

    #[test]
    fn offsets_grow_across_whole_function() {
        let mut arena = ScopeArena::new();

        arena.begin_frame();
        arena.enter();
        let (a, _) = arena.declare_var("a", int(&arena), true);
        arena.enter();
        let (b, _) = arena.declare_var("b", int(&arena), false);
        arena.enter();
        let (c, _) = arena.declare_var("c", int(&arena), false);

        assert_eq!(a.borrow().offset, 4);
        assert_eq!(b.borrow().offset, 8);
        assert_eq!(c.borrow().offset, 12);
        assert_eq!(arena.frame_size(), 12);

        arena.exit();
        arena.exit();
        arena.exit();

        // next function starts over
        arena.begin_frame();
        arena.enter();
        let (x, _) = arena.declare_var("x", int(&arena), false);
        assert_eq!(x.borrow().offset, 4);
        assert_eq!(arena.frame_size(), 4);
    }

    #[test]
    fn char_slots_are_padded() {
        let mut arena = ScopeArena::new();
        let char_type = arena.get_type("char").unwrap();

        arena.enter();
        let (c, _) = arena.declare_var("c", char_type, false);
        let (i, _) = arena.declare_var("i", int(&arena), false);

        assert_eq!(c.borrow().offset, 4);
        assert_eq!(i.borrow().offset, 8);
    }

    #[test]
    fn redeclaration_shadows_in_same_scope() {
        let mut arena = ScopeArena::new();

        arena.enter();
        let (first, redeclared) = arena.declare_var("x", int(&arena), false);
        assert!(!redeclared);

        let (second, redeclared) = arena.declare_var("x", int(&arena), false);
        assert!(redeclared);

        // later declaration wins
        let found = arena.get_var("x").unwrap();
        assert_eq!(found.borrow().offset, second.borrow().offset);
        assert_ne!(first.borrow().offset, second.borrow().offset);
    }
}
