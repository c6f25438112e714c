//! Control-flow shapes shared by the front-ends.
//!
//! Both patterns consume subroutine addresses that the front-end has
//! already pushed with [`Emitter::sub_return`].

use crate::emitter::Emitter;
use crate::error::EmitError;

impl Emitter {
    /// Conditional call. Expects `condition body` on the operand stack.
    pub fn emit_if(&mut self) {
        self.write_call_if();
    }

    /// Loop. Expects `condition body` on the operand stack, both
    /// subroutine addresses.
    ///
    /// The condition sub must leave one flag. The body runs while that flag
    /// is non-zero; the condition is re-evaluated after every iteration and
    /// before the first one.
    pub fn emit_while(&mut self) -> Result<(), EmitError> {
        let condition = self.write_var(0);
        let body = self.write_var(0);
        self.write_store(body);
        self.write_store(condition);

        self.block_create();
        self.write_fetch(body);
        self.write_call();
        let top = self.block_skip()?;

        self.write_fetch(condition);
        self.write_call();
        self.write_push(top);
        self.write_goto_if();
        Ok(())
    }
}
