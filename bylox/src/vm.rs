use std::collections::HashMap;

use crate::{
    compile, Chunk, Error, OpCode, Position, RuntimeError, StrId, StringInterner, Value, MAX_STACK,
};

/// A bytecode virtual machine executing compiled chunks. The machine owns
/// the global variables and the string interner, so globals keep their
/// identity across multiple `interpret` calls in a REPL session.
#[derive(Debug)]
pub struct VM {
    ip: usize,
    stack: Vec<Value>,
    globals: HashMap<StrId, Value>,
    strings: StringInterner,
}

impl Default for VM {
    fn default() -> Self {
        Self {
            ip: 0,
            stack: Vec::with_capacity(MAX_STACK),
            globals: HashMap::default(),
            strings: StringInterner::default(),
        }
    }
}

impl VM {
    /// Compile and run the given source code. Returns an error if either
    /// compilation or execution fails; diagnostics have been written to
    /// stderr by the time this returns.
    pub fn interpret(&mut self, src: &str) -> Result<(), Error> {
        let mut chunk = Chunk::default();
        if !compile(src, &mut chunk, &mut self.strings) {
            return Err(Error::Compile);
        }

        #[cfg(debug_assertions)]
        chunk
            .disassemble("code", &self.strings, &mut std::io::stdout())
            .expect("failed to write disassembly");

        self.stack.clear();
        self.run(&chunk).map_err(|err| {
            eprintln!("{}", err);
            Error::Runtime
        })
    }

    /// Run the virtual machine on the given chunk.
    fn run(&mut self, chunk: &Chunk) -> Result<(), RuntimeError> {
        self.ip = 0;
        loop {
            #[cfg(debug_assertions)]
            {
                print_stack_trace(&self.stack, &self.strings);
                chunk
                    .disassemble_instruction(self.ip, &self.strings, &mut std::io::stdout())
                    .expect("failed to write disassembly");
            }

            let pos = chunk.pos_at(self.ip);
            let byte = chunk.read_u8(self.ip);
            self.ip += 1;
            let opcode =
                OpCode::try_from(byte).map_err(|byte| RuntimeError::InvalidOpcode(pos, byte))?;
            match opcode {
                OpCode::Constant => {
                    let id = self.read_byte(chunk) as u16;
                    self.push(chunk.read_const(id).clone())?;
                }
                OpCode::Constant16 => {
                    let id = self.read_wide(chunk);
                    self.push(chunk.read_const(id).clone())?;
                }
                OpCode::Null => self.push(Value::Null)?,
                OpCode::True => self.push(Value::Bool(true))?,
                OpCode::False => self.push(Value::Bool(false))?,
                OpCode::Pop => {
                    self.pop()?;
                }
                OpCode::GetLocal => {
                    let slot = self.read_byte(chunk) as usize;
                    let local = self.stack[slot].clone();
                    self.push(local)?;
                }
                OpCode::GetLocal16 => {
                    let slot = self.read_wide(chunk) as usize;
                    let local = self.stack[slot].clone();
                    self.push(local)?;
                }
                OpCode::SetLocal => {
                    let slot = self.read_byte(chunk) as usize;
                    self.stack[slot] = self.peek(0)?.clone();
                }
                OpCode::SetLocal16 => {
                    let slot = self.read_wide(chunk) as usize;
                    self.stack[slot] = self.peek(0)?.clone();
                }
                OpCode::GetGlobal => {
                    let id = self.read_byte(chunk) as u16;
                    self.get_global(chunk, id, pos)?;
                }
                OpCode::GetGlobal16 => {
                    let id = self.read_wide(chunk);
                    self.get_global(chunk, id, pos)?;
                }
                OpCode::DefineGlobal => {
                    let id = self.read_byte(chunk) as u16;
                    self.define_global(chunk, id)?;
                }
                OpCode::DefineGlobal16 => {
                    let id = self.read_wide(chunk);
                    self.define_global(chunk, id)?;
                }
                OpCode::SetGlobal => {
                    let id = self.read_byte(chunk) as u16;
                    self.set_global(chunk, id, pos)?;
                }
                OpCode::SetGlobal16 => {
                    let id = self.read_wide(chunk);
                    self.set_global(chunk, id, pos)?;
                }
                OpCode::Equal => {
                    let v2 = self.pop()?;
                    let v1 = self.peek_mut(0)?;
                    *v1 = Value::Bool(v1.equal(&v2));
                }
                OpCode::Greater => match (self.peek(0)?, self.peek(1)?) {
                    (&Value::Number(n2), &Value::Number(n1)) => {
                        self.pop()?;
                        let v1 = self.peek_mut(0)?;
                        *v1 = Value::Bool(n1 > n2);
                    }
                    _ => return Err(RuntimeError::ExpectedTwoNumbers(pos)),
                },
                OpCode::Less => match (self.peek(0)?, self.peek(1)?) {
                    (&Value::Number(n2), &Value::Number(n1)) => {
                        self.pop()?;
                        let v1 = self.peek_mut(0)?;
                        *v1 = Value::Bool(n1 < n2);
                    }
                    _ => return Err(RuntimeError::ExpectedTwoNumbers(pos)),
                },
                OpCode::Add => match (self.peek(0)?, self.peek(1)?) {
                    (&Value::Number(n2), &Value::Number(n1)) => {
                        self.pop()?;
                        let v1 = self.peek_mut(0)?;
                        *v1 = Value::Number(n1 + n2);
                    }
                    (&Value::Str(s2), &Value::Str(s1)) => {
                        let mut res = self
                            .strings
                            .resolve(s1)
                            .expect("String must be allocated prior to access.")
                            .to_string();
                        res += self
                            .strings
                            .resolve(s2)
                            .expect("String must be allocated prior to access.");
                        self.pop()?;
                        let id = self.strings.get_or_intern(res);
                        let v1 = self.peek_mut(0)?;
                        *v1 = Value::Str(id);
                    }
                    _ => return Err(RuntimeError::InvalidAddOperands(pos)),
                },
                OpCode::Subtract => match (self.peek(0)?, self.peek(1)?) {
                    (&Value::Number(n2), &Value::Number(n1)) => {
                        self.pop()?;
                        let v1 = self.peek_mut(0)?;
                        *v1 = Value::Number(n1 - n2);
                    }
                    _ => return Err(RuntimeError::ExpectedTwoNumbers(pos)),
                },
                OpCode::Multiply => match (self.peek(0)?, self.peek(1)?) {
                    (&Value::Number(n2), &Value::Number(n1)) => {
                        self.pop()?;
                        let v1 = self.peek_mut(0)?;
                        *v1 = Value::Number(n1 * n2);
                    }
                    _ => return Err(RuntimeError::ExpectedTwoNumbers(pos)),
                },
                OpCode::Divide => match (self.peek(0)?, self.peek(1)?) {
                    (&Value::Number(n2), &Value::Number(n1)) => {
                        self.pop()?;
                        let v1 = self.peek_mut(0)?;
                        *v1 = Value::Number(n1 / n2);
                    }
                    _ => return Err(RuntimeError::ExpectedTwoNumbers(pos)),
                },
                OpCode::Not => {
                    let v = self.peek_mut(0)?;
                    *v = Value::Bool(v.is_falsey());
                }
                OpCode::Negate => match self.peek_mut(0)? {
                    Value::Number(v) => {
                        *v = -*v;
                    }
                    _ => return Err(RuntimeError::ExpectedNumber(pos)),
                },
                OpCode::Print => {
                    let v = self.pop()?;
                    println!("{}", v.as_string(&self.strings));
                }
                OpCode::Jump => {
                    let offset = self.read_wide(chunk) as usize;
                    self.ip += offset;
                }
                OpCode::JumpIfFalse => {
                    let offset = self.read_wide(chunk) as usize;
                    if self.peek(0)?.is_falsey() {
                        self.ip += offset;
                    }
                }
                OpCode::Loop => {
                    let offset = self.read_wide(chunk) as usize;
                    self.ip -= offset;
                }
                OpCode::Call => return Err(RuntimeError::UnsupportedOpcode(pos, "OP_CALL")),
                OpCode::Closure => return Err(RuntimeError::UnsupportedOpcode(pos, "OP_CLOSURE")),
                OpCode::Return => {
                    // exit the interpreter
                    return Ok(());
                }
            }
        }
    }

    fn read_byte(&mut self, chunk: &Chunk) -> u8 {
        let byte = chunk.read_u8(self.ip);
        self.ip += 1;
        byte
    }

    fn read_wide(&mut self, chunk: &Chunk) -> u16 {
        let operand = chunk.read_u16(self.ip);
        self.ip += 2;
        operand
    }

    fn get_global(&mut self, chunk: &Chunk, id: u16, pos: Position) -> Result<(), RuntimeError> {
        let name = global_name(chunk, id);
        match self.globals.get(&name) {
            Some(val) => {
                let val = val.clone();
                self.push(val)
            }
            None => Err(RuntimeError::UndefinedVariable(
                pos,
                self.resolve_name(name),
            )),
        }
    }

    fn define_global(&mut self, chunk: &Chunk, id: u16) -> Result<(), RuntimeError> {
        let name = global_name(chunk, id);
        let val = self.peek(0)?.clone();
        self.globals.insert(name, val);
        self.pop()?;
        Ok(())
    }

    fn set_global(&mut self, chunk: &Chunk, id: u16, pos: Position) -> Result<(), RuntimeError> {
        let name = global_name(chunk, id);
        if !self.globals.contains_key(&name) {
            return Err(RuntimeError::UndefinedVariable(
                pos,
                self.resolve_name(name),
            ));
        }
        let val = self.peek(0)?.clone();
        self.globals.insert(name, val);
        Ok(())
    }

    fn resolve_name(&self, name: StrId) -> String {
        self.strings
            .resolve(name)
            .expect("String must be allocated prior to access.")
            .to_string()
    }

    fn peek(&self, steps: usize) -> Result<&Value, RuntimeError> {
        self.stack
            .len()
            .checked_sub(steps + 1)
            .and_then(|idx| self.stack.get(idx))
            .ok_or(RuntimeError::StackUnderflow)
    }

    fn peek_mut(&mut self, steps: usize) -> Result<&mut Value, RuntimeError> {
        let idx = self
            .stack
            .len()
            .checked_sub(steps + 1)
            .ok_or(RuntimeError::StackUnderflow)?;
        self.stack.get_mut(idx).ok_or(RuntimeError::StackUnderflow)
    }

    fn push(&mut self, val: Value) -> Result<(), RuntimeError> {
        if self.stack.len() == MAX_STACK {
            return Err(RuntimeError::StackOverflow);
        }
        self.stack.push(val);
        Ok(())
    }

    fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow)
    }
}

fn global_name(chunk: &Chunk, id: u16) -> StrId {
    match chunk.read_const(id) {
        Value::Str(name) => *name,
        _ => unreachable!("Constant for the variable name must have been added."),
    }
}

#[cfg(debug_assertions)]
fn print_stack_trace(stack: &[Value], strings: &StringInterner) {
    print!("          ");
    for val in stack {
        print!("[ {} ]", val.as_string(strings));
    }
    println!();
}
