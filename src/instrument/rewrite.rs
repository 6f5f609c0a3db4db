// Checkpoint insertion pass

use crate::parser::ast::{AstNode, Program, SourceLocation};

/// Insert `Checkpoint` statements into every function of `program`:
/// at the start of each loop body, after each declaration and expression
/// statement, and before each `return`.
pub fn insert_checkpoints(program: &mut Program) {
    for function in &mut program.functions {
        let body = std::mem::take(&mut function.body);
        function.body = rewrite_block(body);
    }
}

fn rewrite_block(body: Vec<AstNode>) -> Vec<AstNode> {
    let mut out = Vec::with_capacity(body.len() * 2);
    for stmt in body {
        let location = *stmt.location();
        match stmt {
            AstNode::VarDecl { .. } | AstNode::ExpressionStatement { .. } => {
                out.push(stmt);
                out.push(AstNode::Checkpoint { location });
            }
            AstNode::Return { .. } => {
                out.push(AstNode::Checkpoint { location });
                out.push(stmt);
            }
            AstNode::If {
                condition,
                then_branch,
                else_branch,
                location,
            } => out.push(AstNode::If {
                condition,
                then_branch: rewrite_block(then_branch),
                else_branch: else_branch.map(rewrite_block),
                location,
            }),
            AstNode::While {
                condition,
                body,
                location,
            } => out.push(AstNode::While {
                condition,
                body: rewrite_loop_body(body, location),
                location,
            }),
            AstNode::For {
                init,
                condition,
                increment,
                body,
                location,
            } => out.push(AstNode::For {
                init,
                condition,
                increment,
                body: rewrite_loop_body(body, location),
                location,
            }),
            AstNode::ForOf {
                kind,
                name,
                iterable,
                body,
                location,
            } => out.push(AstNode::ForOf {
                kind,
                name,
                iterable,
                body: rewrite_loop_body(body, location),
                location,
            }),
            AstNode::Block { body, location } => out.push(AstNode::Block {
                body: rewrite_block(body),
                location,
            }),
            other => out.push(other),
        }
    }
    out
}

fn rewrite_loop_body(body: Vec<AstNode>, location: SourceLocation) -> Vec<AstNode> {
    let mut out = vec![AstNode::Checkpoint { location }];
    out.extend(rewrite_block(body));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn checkpoint_lines(nodes: &[AstNode], out: &mut Vec<usize>) {
        for node in nodes {
            match node {
                AstNode::Checkpoint { location } => out.push(location.line),
                AstNode::If {
                    then_branch,
                    else_branch,
                    ..
                } => {
                    checkpoint_lines(then_branch, out);
                    if let Some(e) = else_branch {
                        checkpoint_lines(e, out);
                    }
                }
                AstNode::While { body, .. }
                | AstNode::For { body, .. }
                | AstNode::ForOf { body, .. }
                | AstNode::Block { body, .. } => checkpoint_lines(body, out),
                _ => {}
            }
        }
    }

    #[test]
    fn test_checkpoint_placement() {
        let source = "function f(n) {\n  let s = 0;\n  for (let i = 0; i < n; i++) {\n    s += i;\n  }\n  return s;\n}";
        let mut program = parse(source).unwrap();
        insert_checkpoints(&mut program);

        let body = &program.functions[0].body;
        assert!(matches!(body[0], AstNode::VarDecl { .. }));
        assert!(matches!(body[1], AstNode::Checkpoint { .. }));
        assert!(matches!(body[3], AstNode::Checkpoint { .. }));
        assert!(matches!(body[4], AstNode::Return { .. }));

        let mut lines = Vec::new();
        checkpoint_lines(body, &mut lines);
        assert_eq!(lines, vec![2, 3, 4, 6]);
    }

    #[test]
    fn test_braceless_branches_are_instrumented() {
        let mut program = parse("function f(x) { if (x) return 1; else x++; }").unwrap();
        insert_checkpoints(&mut program);
        match &program.functions[0].body[0] {
            AstNode::If {
                then_branch,
                else_branch,
                ..
            } => {
                assert!(matches!(then_branch[0], AstNode::Checkpoint { .. }));
                assert!(matches!(else_branch.as_ref().unwrap()[1], AstNode::Checkpoint { .. }));
            }
            other => panic!("Expected if, got {:?}", other),
        }
    }
}
